// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Side effect on cancellation.

use crate::stage::StageSlot;
use backflow_core::{
    BackflowError, Publisher, Result, Subscriber, Subscription, SubscriptionControl,
};
use core::marker::PhantomData;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Publisher returned by [`PublisherExt::do_on_cancel`](crate::PublisherExt::do_on_cancel).
///
/// The downstream subscriber receives a wrapping subscription: the first
/// `cancel()` runs the hook, then cancels upstream. Demand is forwarded as is.
pub struct DoOnCancel<P, T, F> {
    stage: StageSlot<P, F>,
    _marker: PhantomData<fn(T)>,
}

impl<P, T, F> DoOnCancel<P, T, F> {
    pub(crate) fn new(upstream: P, hook: F) -> Self {
        Self {
            stage: StageSlot::new(upstream, hook),
            _marker: PhantomData,
        }
    }
}

impl<P, T, F> Publisher<T> for DoOnCancel<P, T, F>
where
    P: Publisher<T>,
    T: 'static,
    F: FnOnce() + Send + 'static,
{
    fn subscribe<S>(&self, subscriber: S) -> Result<Subscription>
    where
        S: Subscriber<T> + 'static,
    {
        let (upstream, hook) = self.stage.take()?;
        let control = Arc::new(HookedControl {
            upstream: Mutex::new(None),
            hook: Mutex::new(Some(hook)),
        });

        let owned = upstream.subscribe(DoOnCancelSubscriber {
            downstream: subscriber,
            control: Arc::downgrade(&control),
        })?;
        // Replace the handle seen in `on_subscribe` with the owning one.
        *control.upstream.lock() = Some(owned);

        Ok(Subscription::new(control))
    }
}

struct HookedControl<F> {
    upstream: Mutex<Option<Subscription>>,
    hook: Mutex<Option<F>>,
}

impl<F> SubscriptionControl for HookedControl<F>
where
    F: FnOnce() + Send,
{
    fn request(&self, n: u64) -> Result<()> {
        let upstream = self.upstream.lock().clone();
        match upstream {
            Some(upstream) => upstream.request(n),
            None if n == 0 => Err(BackflowError::invalid_demand(n)),
            None => Ok(()),
        }
    }

    fn cancel(&self) {
        let hook = self.hook.lock().take();
        if let Some(hook) = hook {
            trace!("running cancellation hook");
            hook();
        }

        let upstream = self.upstream.lock().clone();
        if let Some(upstream) = upstream {
            upstream.cancel();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.upstream
            .lock()
            .as_ref()
            .is_some_and(Subscription::is_cancelled)
    }
}

struct DoOnCancelSubscriber<S, F> {
    downstream: S,
    control: Weak<HookedControl<F>>,
}

impl<S, F, T> Subscriber<T> for DoOnCancelSubscriber<S, F>
where
    S: Subscriber<T>,
    F: FnOnce() + Send + 'static,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        if let Some(control) = self.control.upgrade() {
            *control.upstream.lock() = Some(subscription.clone());
        }
        let hooked = Subscription::from_weak(self.control.clone() as Weak<dyn SubscriptionControl>);
        self.downstream.on_subscribe(&hooked);
    }

    fn on_next(&mut self, item: T) {
        self.downstream.on_next(item);
    }

    fn on_error(&mut self, error: BackflowError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}
