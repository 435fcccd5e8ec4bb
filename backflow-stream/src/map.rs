// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-to-one transformation stage.

use crate::stage::StageSlot;
use backflow_core::{BackflowError, Publisher, Result, Subscriber, Subscription};
use core::marker::PhantomData;

/// Publisher returned by [`PublisherExt::map`](crate::PublisherExt::map).
///
/// Demand and cancellation pass straight through: the downstream subscriber
/// receives the upstream subscription itself.
pub struct Map<P, T, F> {
    stage: StageSlot<P, F>,
    _marker: PhantomData<fn(T)>,
}

impl<P, T, F> Map<P, T, F> {
    pub(crate) fn new(upstream: P, f: F) -> Self {
        Self {
            stage: StageSlot::new(upstream, f),
            _marker: PhantomData,
        }
    }
}

impl<P, T, U, F> Publisher<U> for Map<P, T, F>
where
    P: Publisher<T>,
    T: 'static,
    U: 'static,
    F: FnMut(T) -> U + Send + 'static,
{
    fn subscribe<S>(&self, subscriber: S) -> Result<Subscription>
    where
        S: Subscriber<U> + 'static,
    {
        let (upstream, f) = self.stage.take()?;
        upstream.subscribe(MapSubscriber {
            downstream: subscriber,
            f,
        })
    }
}

struct MapSubscriber<S, F> {
    downstream: S,
    f: F,
}

impl<S, F, T, U> Subscriber<T> for MapSubscriber<S, F>
where
    S: Subscriber<U>,
    F: FnMut(T) -> U + Send,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        let mapped = (self.f)(item);
        self.downstream.on_next(mapped);
    }

    fn on_error(&mut self, error: BackflowError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}
