// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::cancellation_flag::CancellationFlag;
use crate::subscription::{Subscription, SubscriptionControl};
use alloc::boxed::Box;
use alloc::sync::Arc;
use backflow_error::{BackflowError, Result};
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;

/// Shared state of a single-shot publisher subscription: one observer, one
/// terminal event, cooperative cancellation.
pub(crate) struct OneShot<O: ?Sized> {
    observer: Mutex<Option<Box<O>>>,
    flag: CancellationFlag,
    done: AtomicBool,
}

impl<O: ?Sized + Send + 'static> OneShot<O> {
    /// Create the state and its subscription, let `on_subscribe` see the
    /// subscription, then install the observer unless it was cancelled meanwhile.
    pub(crate) fn attach<F>(mut observer: Box<O>, on_subscribe: F) -> (Arc<Self>, Subscription)
    where
        F: FnOnce(&mut O, &Subscription),
    {
        let shot = Arc::new(Self {
            observer: Mutex::new(None),
            flag: CancellationFlag::new(),
            done: AtomicBool::new(false),
        });
        let subscription = Subscription::new(Arc::clone(&shot) as Arc<dyn SubscriptionControl>);

        on_subscribe(&mut *observer, &subscription.downgrade());
        if !shot.flag.is_cancelled() {
            *shot.observer.lock() = Some(observer);
        }

        (shot, subscription)
    }

    /// Claim the terminal event.
    ///
    /// Yields `None` when the subscription was cancelled, in which case the
    /// event is silently dropped.
    pub(crate) fn finish(&self) -> Result<Option<Box<O>>> {
        if self.done.swap(true, Ordering::AcqRel) {
            return Err(BackflowError::DoubleTermination);
        }
        self.flag.terminate();
        Ok(self.observer.lock().take())
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }
}

impl<O: ?Sized + Send + 'static> SubscriptionControl for OneShot<O> {
    fn request(&self, n: u64) -> Result<()> {
        if n == 0 {
            return Err(BackflowError::invalid_demand(n));
        }
        Ok(())
    }

    fn cancel(&self) {
        if self.flag.request_cancel() {
            trace!("single-shot subscription cancelled");
        }
        let observer = self.observer.lock().take();
        drop(observer);
    }

    fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }
}
