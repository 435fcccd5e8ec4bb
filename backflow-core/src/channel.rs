// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bounded, ordered, single-producer/single-consumer signal channel.
//!
//! A channel carries items, one terminal signal (completion or error) and
//! out-of-band cancellation between exactly one [`Emitter`] and one subscriber.
//! The producer may only push as many items as the consumer has requested;
//! what happens beyond that is decided by the [`ChannelConfig`]:
//!
//! | configuration                          | emit without demand              |
//! |----------------------------------------|----------------------------------|
//! | `fail_fast()` (default)                | `Err(NoDemand)`                  |
//! | `bounded(n, DropLatest)`               | staged up to `n`, then dropped   |
//! | `bounded(n, Error)`                    | staged up to `n`, then `Err(BufferOverflow)` |
//! | `unbounded()`                          | always staged                    |
//!
//! Staged items are delivered in emission order as demand arrives, and the
//! terminal signal is delivered only after every staged item.
//!
//! ## Example
//!
//! ```
//! use backflow_core::{channel, ChannelConfig, Emission, FnSubscriber, Publisher};
//! use std::sync::{Arc, Mutex};
//!
//! let (emitter, channel) = channel::<&str>(ChannelConfig::fail_fast());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! let subscription = channel
//!     .subscribe(
//!         FnSubscriber::new(move |item: &'static str| sink.lock().unwrap().push(item))
//!             .with_initial_request(Some(1)),
//!     )
//!     .unwrap();
//!
//! assert_eq!(emitter.emit("Hello").unwrap(), Emission::Delivered);
//! assert!(emitter.emit("World!").is_err());
//!
//! subscription.request(1).unwrap();
//! emitter.emit("World!").unwrap();
//! emitter.complete().unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["Hello", "World!"]);
//! ```

mod config;
mod implementation;

pub use config::{ChannelConfig, OverflowPolicy};

use crate::cancellation_flag::FlagState;
use crate::subscriber::{Publisher, Subscriber};
use crate::subscription::Subscription;
use alloc::boxed::Box;
use alloc::sync::Arc;
use backflow_error::{BackflowError, Result};
use implementation::{Admission, ChannelCore};

/// What happened to an emitted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Covered by outstanding demand and handed to the consumer.
    Delivered,
    /// Staged in the buffer until the consumer requests more.
    Buffered,
    /// Discarded by the `DropLatest` policy.
    Dropped,
    /// Discarded because the consumer cancelled. The producer should stop.
    Cancelled,
    /// Discarded because a terminal signal was already sent.
    Ignored,
}

impl Emission {
    /// `true` if the item will reach the consumer.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Delivered | Self::Buffered)
    }
}

/// Create a channel and its producer handle.
///
/// The [`Emitter`] is bound to this channel only and cannot be cloned.
pub fn channel<T: Send + 'static>(config: ChannelConfig) -> (Emitter<T>, Channel<T>) {
    let core = Arc::new(ChannelCore::new(config));
    (
        Emitter {
            core: Arc::clone(&core),
        },
        Channel { core },
    )
}

/// Consumer side of a channel.
pub struct Channel<T> {
    core: Arc<ChannelCore<T>>,
}

impl<T: Send + 'static> Channel<T> {
    pub fn config(&self) -> ChannelConfig {
        self.core.config()
    }

    pub fn is_subscribed(&self) -> bool {
        self.core.is_subscribed()
    }
}

impl<T: Send + 'static> Publisher<T> for Channel<T> {
    fn subscribe<S>(&self, subscriber: S) -> Result<Subscription>
    where
        S: Subscriber<T> + 'static,
    {
        self.core.subscribe(Box::new(subscriber))
    }
}

/// Producer side of a channel.
///
/// Dropping an emitter that never sent a terminal signal fails the channel
/// with a `StreamProcessing` error, delivered after any staged items.
pub struct Emitter<T> {
    core: Arc<ChannelCore<T>>,
}

impl<T> Drop for Emitter<T> {
    fn drop(&mut self) {
        self.core.abandon();
    }
}

impl<T: Send + 'static> Emitter<T> {
    /// Push one item.
    ///
    /// After cancellation or a terminal signal this is a silent no-op that
    /// reports [`Emission::Cancelled`] or [`Emission::Ignored`].
    ///
    /// # Errors
    ///
    /// - `NoDemand` when a fail-fast channel has no outstanding demand
    /// - `BufferOverflow` when a bounded `Error`-policy buffer is full
    pub fn emit(&self, item: T) -> Result<Emission> {
        self.core.emit(item)
    }

    /// Push one item, waiting for demand or buffer space instead of applying
    /// the overflow policy.
    ///
    /// Returns [`Emission::Cancelled`] or [`Emission::Ignored`] without waiting
    /// once the channel is cancelled or terminated.
    pub async fn emit_wait(&self, item: T) -> Emission {
        let mut item = item;
        loop {
            match self.core.admit(item) {
                Admission::Accepted(emission) => return emission,
                Admission::Full(returned) => item = returned,
            }

            let listener = self.core.listen_for_space();
            match self.core.admit(item) {
                Admission::Accepted(emission) => return emission,
                Admission::Full(returned) => item = returned,
            }
            listener.await;
        }
    }

    /// Send the completion signal.
    ///
    /// # Errors
    ///
    /// Returns `DoubleTermination` if a terminal signal was already sent.
    pub fn complete(&self) -> Result<()> {
        self.core.complete()
    }

    /// Send the error signal.
    ///
    /// # Errors
    ///
    /// Returns `DoubleTermination` if a terminal signal was already sent.
    pub fn fail(&self, error: BackflowError) -> Result<()> {
        self.core.fail(error)
    }

    /// `true` once the consumer cancelled. Producers poll this between emissions.
    pub fn is_cancelled(&self) -> bool {
        self.core.is_cancelled()
    }

    /// Where the channel stands between active, cancelled and terminated.
    pub fn state(&self) -> FlagState {
        self.core.state()
    }

    /// Demand not yet covered by staged items.
    pub fn requested(&self) -> u64 {
        self.core.requested()
    }

    /// Run `hook` once when the consumer cancels, or immediately if it already has.
    pub fn set_on_cancel<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.core.set_on_cancel(Box::new(hook));
    }

    /// Run `hook` after every successful `request`, replacing any previous hook.
    pub fn set_on_request<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.core.set_on_request(Arc::new(hook));
    }
}
