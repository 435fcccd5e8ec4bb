// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consumer callbacks and the publisher contract.

use crate::subscription::Subscription;
use alloc::boxed::Box;
use backflow_error::{BackflowError, Result};

/// Receiver of the signals of one publisher.
///
/// A publisher calls [`on_subscribe`](Self::on_subscribe) exactly once, before
/// anything else, then any number of [`on_next`](Self::on_next) calls bounded by
/// requested demand, then at most one of [`on_error`](Self::on_error) or
/// [`on_complete`](Self::on_complete). Calls are never concurrent.
pub trait Subscriber<T>: Send {
    /// Receive the subscription handle. Clone it to request or cancel later.
    fn on_subscribe(&mut self, subscription: &Subscription) {
        let _ = subscription;
    }

    fn on_next(&mut self, item: T);

    fn on_error(&mut self, error: BackflowError);

    fn on_complete(&mut self);
}

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        (**self).on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        (**self).on_next(item);
    }

    fn on_error(&mut self, error: BackflowError) {
        (**self).on_error(error);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

/// Source of items for a single [`Subscriber`].
///
/// Channels and pipeline stages accept one subscriber; a second call to
/// [`subscribe`](Self::subscribe) fails with
/// [`BackflowError::AlreadySubscribed`]. Cold sources create a fresh channel
/// per subscriber.
pub trait Publisher<T> {
    /// Attach `subscriber` and return its subscription.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySubscribed` when the publisher accepts a single
    /// subscriber and already has one.
    fn subscribe<S>(&self, subscriber: S) -> Result<Subscription>
    where
        S: Subscriber<T> + 'static;
}

fn log_unhandled(error: BackflowError) {
    warn!("unhandled upstream error: {}", error);
}

fn noop() {}

/// Subscriber assembled from closures.
///
/// By default it requests unbounded demand on subscription, logs errors
/// and ignores completion.
///
/// # Example
///
/// ```
/// use backflow_core::{channel, ChannelConfig, FnSubscriber, Publisher};
/// use std::sync::{Arc, Mutex};
///
/// let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
///
/// channel
///     .subscribe(FnSubscriber::new(move |item: i32| sink.lock().unwrap().push(item)))
///     .unwrap();
///
/// emitter.emit(1).unwrap();
/// emitter.emit(2).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub struct FnSubscriber<N, E = fn(BackflowError), C = fn()> {
    on_next: N,
    on_error: E,
    on_complete: C,
    initial_request: Option<u64>,
}

impl<N> FnSubscriber<N> {
    pub fn new(on_next: N) -> Self {
        Self {
            on_next,
            on_error: log_unhandled,
            on_complete: noop,
            initial_request: Some(crate::demand::UNBOUNDED),
        }
    }
}

impl<N, E, C> FnSubscriber<N, E, C> {
    pub fn on_error<E2>(self, on_error: E2) -> FnSubscriber<N, E2, C> {
        FnSubscriber {
            on_next: self.on_next,
            on_error,
            on_complete: self.on_complete,
            initial_request: self.initial_request,
        }
    }

    pub fn on_complete<C2>(self, on_complete: C2) -> FnSubscriber<N, E, C2> {
        FnSubscriber {
            on_next: self.on_next,
            on_error: self.on_error,
            on_complete,
            initial_request: self.initial_request,
        }
    }

    /// Replace the unbounded initial request with `n` items.
    ///
    /// `None` issues no request at all; demand is then driven externally
    /// through the returned subscription.
    #[must_use]
    pub fn with_initial_request(mut self, n: Option<u64>) -> Self {
        self.initial_request = n;
        self
    }
}

impl<T, N, E, C> Subscriber<T> for FnSubscriber<N, E, C>
where
    N: FnMut(T) + Send,
    E: FnMut(BackflowError) + Send,
    C: FnMut() + Send,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        if let Some(n) = self.initial_request {
            if let Err(error) = subscription.request(n) {
                warn!("initial request rejected: {}", error);
            }
        }
    }

    fn on_next(&mut self, item: T) {
        (self.on_next)(item);
    }

    fn on_error(&mut self, error: BackflowError) {
        (self.on_error)(error);
    }

    fn on_complete(&mut self) {
        (self.on_complete)();
    }
}
