// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold, pull-driven sources.
//!
//! A source holds a recipe for its items. Every subscription builds a fresh
//! fail-fast channel and a pump that emits exactly as many items as the
//! consumer has requested, then completes once the iterator is exhausted.
//! The pump lives as long as the subscription returned by `subscribe`.

mod implementation;

use backflow_core::{
    channel, ChannelConfig, Publisher, Result, Subscriber, Subscription, SubscriptionControl,
};
use implementation::Pump;
use std::sync::Arc;

/// Publisher backed by a cloneable iterable. See [`just`], [`range`] and [`from_iter`].
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    items: I,
}

/// Emit the given items in order, then complete.
pub fn just<T>(items: Vec<T>) -> IterSource<Vec<T>>
where
    T: Clone + Send + 'static,
{
    IterSource { items }
}

/// Emit `count` consecutive integers starting at `start`, then complete.
///
/// ```
/// use backflow_core::{Publisher, Signal};
/// use backflow_stream::range;
/// use backflow_test_utils::RecordingSubscriber;
///
/// let (subscriber, recorder) = RecordingSubscriber::new();
/// range(10, 3)
///     .subscribe(subscriber.with_initial_request(5))
///     .unwrap();
///
/// assert_eq!(
///     recorder.signals(),
///     vec![Signal::Item(10), Signal::Item(11), Signal::Item(12), Signal::Complete]
/// );
/// ```
pub fn range(start: i64, count: u64) -> IterSource<core::ops::Range<i64>> {
    let end = i64::try_from(count)
        .ok()
        .and_then(|count| start.checked_add(count))
        .unwrap_or(i64::MAX);
    IterSource { items: start..end }
}

/// Emit everything `items` yields, re-iterating a clone per subscription.
pub fn from_iter<I>(items: I) -> IterSource<I>
where
    I: IntoIterator + Clone,
{
    IterSource { items }
}

impl<I> Publisher<I::Item> for IterSource<I>
where
    I: IntoIterator + Clone,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    /// The returned subscription owns the pump. Dropping every clone of it
    /// cancels the source.
    fn subscribe<S>(&self, subscriber: S) -> Result<Subscription>
    where
        S: Subscriber<I::Item> + 'static,
    {
        let (emitter, channel) = channel(ChannelConfig::fail_fast());
        let pump = Arc::new(Pump::new(emitter, self.items.clone().into_iter()));

        let hook = Arc::downgrade(&pump);
        pump.emitter().set_on_request(move || {
            if let Some(pump) = hook.upgrade() {
                pump.drain();
            }
        });

        let subscription = channel.subscribe(subscriber)?;
        // Covers sources that complete without any demand.
        pump.drain();
        Ok(Subscription::from_control(SourceControl {
            channel: subscription,
            _pump: pump,
        }))
    }
}

struct SourceControl<I: Iterator> {
    channel: Subscription,
    _pump: Arc<Pump<I>>,
}

impl<I> SubscriptionControl for SourceControl<I>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    fn request(&self, n: u64) -> Result<()> {
        self.channel.request(n)
    }

    fn cancel(&self) {
        self.channel.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.channel.is_cancelled()
    }
}

impl<I: Iterator> Drop for SourceControl<I> {
    fn drop(&mut self) {
        self.channel.cancel();
    }
}
