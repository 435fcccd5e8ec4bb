// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{BackflowError, Publisher, Result, Signal, StreamItem, Subscriber, Subscription};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::stream::{FusedStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Extension trait turning a [`Publisher`] into an async [`Stream`].
pub trait SignalStreamExt<T>: Publisher<T> + Sized {
    /// Subscribe and expose the signals as a stream of [`StreamItem`]s.
    ///
    /// `prefetch` items are requested up front. Once three quarters of them
    /// have been consumed, the same amount is requested again, so at most
    /// `prefetch` items wait in the stream at any time. An upstream error is
    /// yielded as `StreamItem::Error` and ends the stream; completion ends it
    /// silently. Dropping the stream cancels the subscription.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDemand` when `prefetch` is zero and `AlreadySubscribed`
    /// when the publisher accepts only one subscriber and already has it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backflow_exec::SignalStreamExt;
    /// use backflow_stream::range;
    /// use futures::StreamExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let stream = range(0, 5).into_signal_stream(2).unwrap();
    /// let values: Vec<i64> = stream.map(|item| item.unwrap()).collect().await;
    ///
    /// assert_eq!(values, vec![0, 1, 2, 3, 4]);
    /// # }
    /// ```
    fn into_signal_stream(self, prefetch: usize) -> Result<SignalStream<T>>;
}

impl<P, T> SignalStreamExt<T> for P
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn into_signal_stream(self, prefetch: usize) -> Result<SignalStream<T>> {
        if prefetch == 0 {
            return Err(BackflowError::invalid_demand(0));
        }

        let (sender, receiver) = unbounded();
        let subscription = self.subscribe(ForwardingSubscriber { sender })?;
        let prefetch = prefetch as u64;
        subscription.request(prefetch)?;

        Ok(SignalStream {
            receiver,
            subscription,
            limit: prefetch - (prefetch >> 2),
            consumed: 0,
            done: false,
        })
    }
}

struct ForwardingSubscriber<T> {
    sender: UnboundedSender<Signal<T>>,
}

impl<T: Send> Subscriber<T> for ForwardingSubscriber<T> {
    fn on_next(&mut self, item: T) {
        // A closed receiver means the stream was dropped and has cancelled.
        let _ = self.sender.unbounded_send(Signal::Item(item));
    }

    fn on_error(&mut self, error: BackflowError) {
        let _ = self.sender.unbounded_send(Signal::Error(error));
        self.sender.close_channel();
    }

    fn on_complete(&mut self) {
        let _ = self.sender.unbounded_send(Signal::Complete);
        self.sender.close_channel();
    }
}

/// Stream returned by [`SignalStreamExt::into_signal_stream`].
pub struct SignalStream<T> {
    receiver: UnboundedReceiver<Signal<T>>,
    subscription: Subscription,
    limit: u64,
    consumed: u64,
    done: bool,
}

impl<T> SignalStream<T> {
    /// The underlying subscription, e.g. to hand to a
    /// [`CompositeSubscription`](backflow_core::CompositeSubscription).
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn replenish(&mut self) {
        self.consumed += 1;
        if self.consumed < self.limit {
            return;
        }

        let batch = self.consumed;
        self.consumed = 0;
        if let Err(error) = self.subscription.request(batch) {
            error!("could not replenish demand: {}", error);
        }
    }
}

impl<T> Stream for SignalStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        match this.receiver.poll_next_unpin(cx) {
            Poll::Ready(Some(Signal::Item(item))) => {
                this.replenish();
                Poll::Ready(Some(StreamItem::Value(item)))
            }
            Poll::Ready(Some(Signal::Error(error))) => {
                this.done = true;
                Poll::Ready(Some(StreamItem::Error(error)))
            }
            Poll::Ready(Some(Signal::Complete)) | Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> FusedStream for SignalStream<T> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<T> Drop for SignalStream<T> {
    fn drop(&mut self) {
        if !self.done {
            debug!("signal stream dropped before its terminal signal, cancelling");
        }
        self.subscription.cancel();
    }
}
