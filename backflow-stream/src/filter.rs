// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand-compensating filter stage.

use crate::stage::StageSlot;
use backflow_core::{BackflowError, Publisher, Result, Subscriber, Subscription};
use core::marker::PhantomData;

/// Publisher returned by [`PublisherExt::filter`](crate::PublisherExt::filter).
///
/// Downstream demand is forwarded upstream unchanged. Every rejected item
/// consumed one unit of that demand without producing output, so the stage
/// replaces it with a `request(1)` upstream. The number of items in flight
/// therefore always matches what the downstream subscriber asked for.
pub struct Filter<P, T, F> {
    stage: StageSlot<P, F>,
    _marker: PhantomData<fn(T)>,
}

impl<P, T, F> Filter<P, T, F> {
    pub(crate) fn new(upstream: P, predicate: F) -> Self {
        Self {
            stage: StageSlot::new(upstream, predicate),
            _marker: PhantomData,
        }
    }
}

impl<P, T, F> Publisher<T> for Filter<P, T, F>
where
    P: Publisher<T>,
    T: 'static,
    F: FnMut(&T) -> bool + Send + 'static,
{
    fn subscribe<S>(&self, subscriber: S) -> Result<Subscription>
    where
        S: Subscriber<T> + 'static,
    {
        let (upstream, predicate) = self.stage.take()?;
        upstream.subscribe(FilterSubscriber {
            downstream: subscriber,
            predicate,
            upstream: None,
        })
    }
}

struct FilterSubscriber<S, F> {
    downstream: S,
    predicate: F,
    upstream: Option<Subscription>,
}

impl<S, F, T> Subscriber<T> for FilterSubscriber<S, F>
where
    S: Subscriber<T>,
    F: FnMut(&T) -> bool + Send,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        if (self.predicate)(&item) {
            self.downstream.on_next(item);
            return;
        }

        if let Some(upstream) = &self.upstream {
            if let Err(error) = upstream.request(1) {
                warn!("filter could not replace a rejected item: {}", error);
            }
        }
    }

    fn on_error(&mut self, error: BackflowError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}
