// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fallible transformation stage.

use crate::stage::StageSlot;
use backflow_core::{BackflowError, Publisher, Result, Subscriber, Subscription};
use core::marker::PhantomData;

/// Publisher returned by [`PublisherExt::try_map`](crate::PublisherExt::try_map).
///
/// The first `Err` returned by the mapping function cancels the upstream
/// subscription and is delivered downstream as the error signal. Anything the
/// upstream still sends afterwards is ignored, so the downstream subscriber
/// sees exactly one terminal signal.
pub struct TryMap<P, T, F> {
    stage: StageSlot<P, F>,
    _marker: PhantomData<fn(T)>,
}

impl<P, T, F> TryMap<P, T, F> {
    pub(crate) fn new(upstream: P, f: F) -> Self {
        Self {
            stage: StageSlot::new(upstream, f),
            _marker: PhantomData,
        }
    }
}

impl<P, T, U, F> Publisher<U> for TryMap<P, T, F>
where
    P: Publisher<T>,
    T: 'static,
    U: 'static,
    F: FnMut(T) -> Result<U> + Send + 'static,
{
    fn subscribe<S>(&self, subscriber: S) -> Result<Subscription>
    where
        S: Subscriber<U> + 'static,
    {
        let (upstream, f) = self.stage.take()?;
        upstream.subscribe(TryMapSubscriber {
            downstream: subscriber,
            f,
            upstream: None,
            done: false,
        })
    }
}

struct TryMapSubscriber<S, F> {
    downstream: S,
    f: F,
    upstream: Option<Subscription>,
    done: bool,
}

impl<S, F, T, U> Subscriber<T> for TryMapSubscriber<S, F>
where
    S: Subscriber<U>,
    F: FnMut(T) -> Result<U> + Send,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        if self.done {
            return;
        }

        match (self.f)(item) {
            Ok(mapped) => self.downstream.on_next(mapped),
            Err(error) => {
                debug!("mapping failed, cancelling upstream: {}", error);
                self.done = true;
                if let Some(upstream) = self.upstream.take() {
                    upstream.cancel();
                }
                self.downstream.on_error(error);
            }
        }
    }

    fn on_error(&mut self, error: BackflowError) {
        if !self.done {
            self.done = true;
            self.downstream.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if !self.done {
            self.done = true;
            self.downstream.on_complete();
        }
    }
}
