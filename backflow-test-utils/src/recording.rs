// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{BackflowError, Signal, Subscriber, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

struct Shared<T> {
    signals: Vec<Signal<T>>,
    subscription: Option<Subscription>,
    subscribe_calls: usize,
    dropped: bool,
}

/// Read side of a [`RecordingSubscriber`]; cheap to clone.
pub struct Recorder<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> Recorder<T> {
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.shared.lock().signals.clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.shared
            .lock()
            .signals
            .iter()
            .filter_map(|signal| match signal {
                Signal::Item(item) => Some(item.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<T> Recorder<T> {
    pub fn item_count(&self) -> usize {
        self.shared
            .lock()
            .signals
            .iter()
            .filter(|signal| signal.is_item())
            .count()
    }

    pub fn terminal_count(&self) -> usize {
        self.shared
            .lock()
            .signals
            .iter()
            .filter(|signal| signal.is_terminal())
            .count()
    }

    pub fn is_completed(&self) -> bool {
        self.shared
            .lock()
            .signals
            .iter()
            .any(|signal| matches!(signal, Signal::Complete))
    }

    /// The error delivered to the subscriber, if any.
    pub fn error(&self) -> Option<BackflowError> {
        self.shared
            .lock()
            .signals
            .iter()
            .find_map(|signal| match signal {
                Signal::Error(error) => Some(error.clone()),
                _ => None,
            })
    }

    /// The subscription handed to `on_subscribe`.
    ///
    /// # Panics
    ///
    /// Panics if the subscriber was never subscribed.
    pub fn subscription(&self) -> Subscription {
        self.shared
            .lock()
            .subscription
            .clone()
            .expect("subscriber was never subscribed")
    }

    pub fn subscribe_calls(&self) -> usize {
        self.shared.lock().subscribe_calls
    }

    /// `true` once the publisher released the subscriber.
    pub fn is_subscriber_dropped(&self) -> bool {
        self.shared.lock().dropped
    }
}

/// Subscriber that records every signal.
///
/// By default it issues no demand; configure it with the builder methods.
pub struct RecordingSubscriber<T> {
    shared: Arc<Mutex<Shared<T>>>,
    initial_request: Option<u64>,
    request_on_next: Option<u64>,
    cancel_after: Option<usize>,
    received: usize,
}

impl<T> RecordingSubscriber<T> {
    pub fn new() -> (Self, Recorder<T>) {
        let shared = Arc::new(Mutex::new(Shared {
            signals: Vec::new(),
            subscription: None,
            subscribe_calls: 0,
            dropped: false,
        }));
        let recorder = Recorder {
            shared: Arc::clone(&shared),
        };
        (
            Self {
                shared,
                initial_request: None,
                request_on_next: None,
                cancel_after: None,
                received: 0,
            },
            recorder,
        )
    }

    /// Request `n` items from inside `on_subscribe`.
    #[must_use]
    pub fn with_initial_request(mut self, n: u64) -> Self {
        self.initial_request = Some(n);
        self
    }

    /// Request `n` more items from inside every `on_next`.
    #[must_use]
    pub fn request_on_next(mut self, n: u64) -> Self {
        self.request_on_next = Some(n);
        self
    }

    /// Cancel from inside `on_next` once `count` items were received.
    #[must_use]
    pub fn cancel_after(mut self, count: usize) -> Self {
        self.cancel_after = Some(count);
        self
    }

    fn subscription(&self) -> Option<Subscription> {
        self.shared.lock().subscription.clone()
    }
}

impl<T> Drop for RecordingSubscriber<T> {
    fn drop(&mut self) {
        self.shared.lock().dropped = true;
    }
}

impl<T: Send> Subscriber<T> for RecordingSubscriber<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        {
            let mut shared = self.shared.lock();
            shared.subscription = Some(subscription.clone());
            shared.subscribe_calls += 1;
        }
        if let Some(n) = self.initial_request {
            subscription
                .request(n)
                .expect("initial request must be accepted");
        }
    }

    fn on_next(&mut self, item: T) {
        self.shared.lock().signals.push(Signal::Item(item));
        self.received += 1;

        let Some(subscription) = self.subscription() else {
            return;
        };
        if self.cancel_after == Some(self.received) {
            subscription.cancel();
            return;
        }
        if let Some(n) = self.request_on_next {
            subscription
                .request(n)
                .expect("replenishing request must be accepted");
        }
    }

    fn on_error(&mut self, error: BackflowError) {
        self.shared.lock().signals.push(Signal::Error(error));
    }

    fn on_complete(&mut self) {
        self.shared.lock().signals.push(Signal::Complete);
    }
}
