// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A set of subscriptions cancelled together.

use crate::subscription::Subscription;
use alloc::vec::Vec;
use parking_lot::Mutex;

struct CompositeState {
    disposed: bool,
    subscriptions: Vec<Subscription>,
}

/// Groups subscriptions of independent pipelines so they can be cancelled at once.
///
/// Once [`dispose_all`](Self::dispose_all) has run, every later
/// [`add`](Self::add) cancels its argument synchronously instead of holding it.
/// All cancellation happens outside the internal lock.
///
/// # Example
///
/// ```
/// use backflow_core::{channel, ChannelConfig, CompositeSubscription, FnSubscriber, Publisher};
///
/// let composite = CompositeSubscription::new();
/// let (_emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
/// let subscription = channel.subscribe(FnSubscriber::new(|_item: u32| {})).unwrap();
///
/// composite.add(subscription.clone());
/// composite.dispose_all();
///
/// assert!(subscription.is_cancelled());
/// assert!(composite.is_disposed());
/// ```
pub struct CompositeSubscription {
    state: Mutex<CompositeState>,
}

impl CompositeSubscription {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CompositeState {
                disposed: false,
                subscriptions: Vec::new(),
            }),
        }
    }

    /// Hold `subscription`, or cancel it right away if the set is already disposed.
    ///
    /// Returns `true` when the subscription was added.
    pub fn add(&self, subscription: Subscription) -> bool {
        {
            let mut state = self.state.lock();
            if !state.disposed {
                state.subscriptions.push(subscription);
                return true;
            }
        }

        trace!("composite already disposed, cancelling added subscription");
        subscription.cancel();
        false
    }

    /// Cancel every held subscription once and mark the set disposed.
    ///
    /// Idempotent: a second call finds nothing left to cancel.
    pub fn dispose_all(&self) {
        let subscriptions = {
            let mut state = self.state.lock();
            state.disposed = true;
            core::mem::take(&mut state.subscriptions)
        };

        debug!("disposing {} subscriptions", subscriptions.len());
        for subscription in subscriptions {
            subscription.cancel();
        }
    }

    /// Drop cancelled subscriptions from the set without disposing it.
    pub fn purge(&self) {
        self.state
            .lock()
            .subscriptions
            .retain(|subscription| !subscription.is_cancelled());
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    pub fn len(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CompositeSubscription {
    fn default() -> Self {
        Self::new()
    }
}
