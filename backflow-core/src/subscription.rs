// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::demand::UNBOUNDED;
use alloc::sync::{Arc, Weak};
use backflow_error::{BackflowError, Result};
use core::fmt;

/// The demand and cancellation surface behind a [`Subscription`].
///
/// Channels, pipeline stages and single-shot publishers each implement this
/// trait; consumers only ever see the [`Subscription`] wrapper.
pub trait SubscriptionControl: Send + Sync {
    /// Add `n` units of demand.
    ///
    /// # Errors
    ///
    /// Returns [`BackflowError::InvalidDemand`](backflow_error::BackflowError::InvalidDemand)
    /// when `n` is zero.
    fn request(&self, n: u64) -> Result<()>;

    /// Ask the producer to stop. Must be idempotent.
    fn cancel(&self);

    fn is_cancelled(&self) -> bool;
}

/// Consumer handle used to request items and to cancel.
///
/// A subscription either owns its producer/consumer relationship or only
/// refers to it. `subscribe` returns an owning handle; the handle passed to
/// [`Subscriber::on_subscribe`](crate::Subscriber::on_subscribe) is a
/// referring one, so a subscriber that keeps it never keeps its own channel
/// alive. Once every owner is gone, a referring handle reports itself
/// cancelled and ignores requests.
#[derive(Clone)]
pub struct Subscription {
    handle: Handle,
}

#[derive(Clone)]
enum Handle {
    Owning(Arc<dyn SubscriptionControl>),
    Referring(Weak<dyn SubscriptionControl>),
}

impl Subscription {
    pub fn new(control: Arc<dyn SubscriptionControl>) -> Self {
        Self {
            handle: Handle::Owning(control),
        }
    }

    /// Wrap an owned control.
    pub fn from_control<C>(control: C) -> Self
    where
        C: SubscriptionControl + 'static,
    {
        Self::new(Arc::new(control))
    }

    /// A handle that does not keep `control` alive.
    pub fn from_weak(control: Weak<dyn SubscriptionControl>) -> Self {
        Self {
            handle: Handle::Referring(control),
        }
    }

    /// A non-owning handle to the same relationship.
    #[must_use]
    pub fn downgrade(&self) -> Self {
        match &self.handle {
            Handle::Owning(control) => Self::from_weak(Arc::downgrade(control)),
            Handle::Referring(_) => self.clone(),
        }
    }

    /// `true` when this handle keeps the relationship alive.
    pub fn is_owning(&self) -> bool {
        matches!(self.handle, Handle::Owning(_))
    }

    fn with_control<R>(&self, f: impl FnOnce(&dyn SubscriptionControl) -> R) -> Option<R> {
        match &self.handle {
            Handle::Owning(control) => Some(f(control.as_ref())),
            Handle::Referring(control) => control.upgrade().map(|control| f(control.as_ref())),
        }
    }

    /// Request `n` more items. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDemand` when `n` is zero.
    pub fn request(&self, n: u64) -> Result<()> {
        self.with_control(|control| control.request(n))
            .unwrap_or_else(|| match n {
                0 => Err(BackflowError::invalid_demand(n)),
                _ => Ok(()),
            })
    }

    /// Lift every demand limit.
    ///
    /// # Errors
    ///
    /// Never fails for channels; forwarded from the control otherwise.
    pub fn request_unbounded(&self) -> Result<()> {
        self.request(UNBOUNDED)
    }

    /// Cancel the relationship. Calling it again has no further effect.
    pub fn cancel(&self) {
        self.with_control(|control| control.cancel());
    }

    /// `true` once cancelled, or once a referring handle outlived every owner.
    pub fn is_cancelled(&self) -> bool {
        self.with_control(|control| control.is_cancelled())
            .unwrap_or(true)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("owning", &self.is_owning())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
