// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{
    channel, BackflowError, ChannelConfig, Emission, FnSubscriber, Publisher, Signal, Subscriber,
    UNBOUNDED,
};
use backflow_test_utils::{injected_error, RecordingSubscriber};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_subscribe_twice_fails() {
    // Arrange
    let (_emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (first, _) = RecordingSubscriber::new();
    let (second, second_recorder) = RecordingSubscriber::new();

    // Act
    let result = channel.subscribe(first);
    let again = channel.subscribe(second);

    // Assert
    assert!(result.is_ok());
    assert!(matches!(again, Err(BackflowError::AlreadySubscribed)));
    assert_eq!(second_recorder.subscribe_calls(), 0);
    assert!(channel.is_subscribed());
}

#[test]
fn test_request_zero_is_rejected_without_state_change() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, _) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber).unwrap();

    // Act
    let result = subscription.request(0);

    // Assert
    assert!(matches!(
        result,
        Err(BackflowError::InvalidDemand { requested: 0 })
    ));
    assert_eq!(emitter.requested(), 0);
    assert!(matches!(emitter.emit(1), Err(BackflowError::NoDemand)));
}

#[test]
fn test_emit_without_demand_fails_fast() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    channel.subscribe(subscriber).unwrap();

    // Act
    let result = emitter.emit(1);

    // Assert
    assert!(matches!(result, Err(BackflowError::NoDemand)));
    assert!(recorder.signals().is_empty());
}

#[test]
fn test_emit_before_subscription_fails_fast() {
    let (emitter, _channel) = channel::<i32>(ChannelConfig::fail_fast());

    assert!(matches!(emitter.emit(1), Err(BackflowError::NoDemand)));
}

#[test]
fn test_delivered_items_never_exceed_requested_demand() {
    // Arrange
    let (emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber).unwrap();
    let requests = [1u64, 3, 2];
    let mut total_requested = 0u64;
    let mut next = 0u32;

    // Act & Assert
    for n in requests {
        subscription.request(n).unwrap();
        total_requested += n;

        loop {
            match emitter.emit(next) {
                Ok(Emission::Delivered) => next += 1,
                Err(BackflowError::NoDemand) => break,
                other => panic!("unexpected emission: {other:?}"),
            }
            assert!(recorder.item_count() as u64 <= total_requested);
        }

        assert_eq!(recorder.item_count() as u64, total_requested);
    }

    assert_eq!(recorder.items(), (0..6).collect::<Vec<_>>());
}

#[test]
fn test_items_are_delivered_in_order_before_completion() {
    // Arrange
    let (emitter, channel) = channel::<char>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    channel.subscribe(subscriber.with_initial_request(3)).unwrap();

    // Act
    emitter.emit('a').unwrap();
    emitter.emit('b').unwrap();
    emitter.emit('c').unwrap();
    emitter.complete().unwrap();

    // Assert
    assert_eq!(
        recorder.signals(),
        vec![
            Signal::Item('a'),
            Signal::Item('b'),
            Signal::Item('c'),
            Signal::Complete
        ]
    );
}

#[test]
fn test_error_is_delivered_once_and_closes_channel() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    channel.subscribe(subscriber.with_initial_request(5)).unwrap();

    // Act
    emitter.emit(1).unwrap();
    emitter.fail(injected_error("producer broke")).unwrap();
    let after = emitter.emit(2).unwrap();

    // Assert
    assert_eq!(after, Emission::Ignored);
    assert_eq!(recorder.items(), vec![1]);
    assert_eq!(recorder.terminal_count(), 1);
    let error = recorder.error().expect("error delivered");
    assert!(error.is_upstream());
    assert!(error.to_string().contains("producer broke"));
}

#[test]
fn test_complete_after_complete_is_double_termination() {
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    channel.subscribe(subscriber).unwrap();

    emitter.complete().unwrap();

    assert!(matches!(
        emitter.complete(),
        Err(BackflowError::DoubleTermination)
    ));
    assert_eq!(recorder.terminal_count(), 1);
}

#[test]
fn test_complete_after_fail_is_double_termination() {
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    channel.subscribe(subscriber).unwrap();

    emitter.fail(injected_error("first")).unwrap();

    assert!(matches!(
        emitter.complete(),
        Err(BackflowError::DoubleTermination)
    ));
    assert!(matches!(
        emitter.fail(injected_error("second")),
        Err(BackflowError::DoubleTermination)
    ));
    assert_eq!(recorder.terminal_count(), 1);
}

#[test]
fn test_emit_after_terminal_is_silent_noop() {
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    channel.subscribe(subscriber.with_initial_request(10)).unwrap();

    emitter.complete().unwrap();

    assert_eq!(emitter.emit(1).unwrap(), Emission::Ignored);
    assert_eq!(recorder.signals(), vec![Signal::Complete]);
}

#[test]
fn test_terminal_before_subscription_is_delivered_on_subscribe() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    emitter.complete().unwrap();
    let (subscriber, recorder) = RecordingSubscriber::new();

    // Act
    channel.subscribe(subscriber).unwrap();

    // Assert
    assert_eq!(recorder.signals(), vec![Signal::Complete]);
}

#[test]
fn test_cancel_is_idempotent_and_notifies_once() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    emitter.set_on_cancel(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let (subscriber, _) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber).unwrap();

    // Act
    subscription.cancel();
    subscription.cancel();

    // Assert
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    assert!(subscription.is_cancelled());
    assert!(emitter.is_cancelled());
}

#[test]
fn test_set_on_cancel_after_cancellation_runs_immediately() {
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, _) = RecordingSubscriber::new();
    channel.subscribe(subscriber).unwrap().cancel();
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();

    emitter.set_on_cancel(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[test]
fn test_emit_after_cancel_is_dropped_silently() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber.with_initial_request(5)).unwrap();
    emitter.emit(1).unwrap();

    // Act
    subscription.cancel();
    let emission = emitter.emit(2).unwrap();

    // Assert
    assert_eq!(emission, Emission::Cancelled);
    assert_eq!(recorder.items(), vec![1]);
}

#[test]
fn test_complete_under_cancellation_terminates_without_delivery() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber).unwrap();
    subscription.cancel();

    // Act
    let result = emitter.complete();

    // Assert
    assert!(result.is_ok());
    assert!(recorder.signals().is_empty());
    assert!(matches!(
        emitter.complete(),
        Err(BackflowError::DoubleTermination)
    ));
}

#[test]
fn test_request_from_inside_on_next_delivers_next_item() {
    // Arrange: the consumer asks for one item at a time from its callbacks
    let (emitter, channel) = channel::<&'static str>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    channel
        .subscribe(subscriber.with_initial_request(1).request_on_next(1))
        .unwrap();

    // Act
    for data in ["Hello", "World!"] {
        if emitter.is_cancelled() {
            return;
        }
        assert_eq!(emitter.emit(data).unwrap(), Emission::Delivered);
    }
    emitter.complete().unwrap();

    // Assert
    assert_eq!(
        recorder.signals(),
        vec![
            Signal::Item("Hello"),
            Signal::Item("World!"),
            Signal::Complete
        ]
    );
}

#[test]
fn test_cancel_from_inside_on_next_stops_delivery() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::unbounded());
    let (subscriber, recorder) = RecordingSubscriber::new();
    for item in 0..5 {
        emitter.emit(item).unwrap();
    }

    // Act
    channel
        .subscribe(subscriber.with_initial_request(UNBOUNDED).cancel_after(2))
        .unwrap();

    // Assert
    assert_eq!(recorder.items(), vec![0, 1]);
    assert!(emitter.is_cancelled());
    assert_eq!(emitter.emit(5).unwrap(), Emission::Cancelled);
}

#[test]
fn test_on_request_hook_runs_after_each_request() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    emitter.set_on_request(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let (subscriber, _) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber).unwrap();

    // Act
    subscription.request(2).unwrap();
    subscription.request(1).unwrap();
    let _ = subscription.request(0);

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(emitter.requested(), 3);
}

#[test]
fn test_fn_subscriber_requests_unbounded_by_default() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let sum = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let (sum_sink, completed_sink) = (sum.clone(), completed.clone());

    channel
        .subscribe(
            FnSubscriber::new(move |item: i32| {
                sum_sink.fetch_add(item as usize, Ordering::SeqCst);
            })
            .on_complete(move || {
                completed_sink.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    // Act
    for item in 1..=100 {
        emitter.emit(item).unwrap();
    }
    emitter.complete().unwrap();

    // Assert
    assert_eq!(sum.load(Ordering::SeqCst), 5050);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_fn_subscriber_receives_error() {
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let errors = Arc::new(AtomicUsize::new(0));
    let sink = errors.clone();

    channel
        .subscribe(FnSubscriber::new(|_item: i32| {}).on_error(move |error: BackflowError| {
            assert!(error.is_upstream());
            sink.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    emitter.fail(injected_error("boom")).unwrap();

    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[test]
fn test_subscriber_released_once_every_handle_is_dropped() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::unbounded());
    let (subscriber, recorder) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber).unwrap();
    assert_eq!(emitter.emit(1).unwrap(), Emission::Buffered);

    // Act
    drop(emitter);
    assert!(!recorder.is_subscriber_dropped());
    drop(subscription);
    drop(channel);

    // Assert: the handle kept by the subscriber does not keep the channel alive
    assert!(recorder.is_subscriber_dropped());
    assert!(recorder.signals().is_empty());
    assert!(recorder.subscription().is_cancelled());
}

#[test]
fn test_dropped_emitter_fails_channel_after_staged_items() -> anyhow::Result<()> {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::unbounded());
    let (subscriber, recorder) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber)?;
    emitter.emit(1)?;
    emitter.emit(2)?;

    // Act
    drop(emitter);
    subscription.request(5)?;

    // Assert
    let signals = recorder.signals();
    assert_eq!(signals[..2], [Signal::Item(1), Signal::Item(2)]);
    assert!(matches!(
        signals.get(2),
        Some(Signal::Error(BackflowError::StreamProcessing { .. }))
    ));
    assert_eq!(recorder.terminal_count(), 1);
    assert!(recorder.is_subscriber_dropped());
    Ok(())
}

#[test]
fn test_dropped_emitter_after_cancel_delivers_nothing() {
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    let subscription = channel.subscribe(subscriber).unwrap();

    subscription.cancel();
    drop(emitter);

    assert!(recorder.signals().is_empty());
    assert!(recorder.is_subscriber_dropped());
}

#[test]
fn test_cancel_hook_may_register_another_hook() {
    for _ in 0..200 {
        // Arrange
        let (emitter, channel) = channel::<u8>(ChannelConfig::fail_fast());
        let (subscriber, _) = RecordingSubscriber::new();
        let subscription = channel.subscribe(subscriber).unwrap();
        let emitter = Arc::new(emitter);
        let inner_hooks = Arc::new(AtomicUsize::new(0));

        // Act: registration races the cancellation
        let canceller = thread::spawn(move || subscription.cancel());
        emitter.set_on_cancel({
            let emitter = emitter.clone();
            let inner_hooks = inner_hooks.clone();
            move || {
                emitter.set_on_cancel(move || {
                    inner_hooks.fetch_add(1, Ordering::SeqCst);
                });
            }
        });
        canceller.join().unwrap();

        // Assert
        assert_eq!(inner_hooks.load(Ordering::SeqCst), 1);
    }
}

struct PanicOnce {
    panicked: bool,
    items: Arc<Mutex<Vec<i32>>>,
}

impl Subscriber<i32> for PanicOnce {
    fn on_subscribe(&mut self, subscription: &backflow_core::Subscription) {
        subscription.request(UNBOUNDED).unwrap();
    }

    fn on_next(&mut self, item: i32) {
        if !self.panicked {
            self.panicked = true;
            panic!("subscriber failed on {item}");
        }
        self.items.lock().push(item);
    }

    fn on_error(&mut self, _error: BackflowError) {}

    fn on_complete(&mut self) {}
}

#[test]
fn test_channel_keeps_delivering_after_subscriber_panic() {
    // Arrange
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let items = Arc::new(Mutex::new(Vec::new()));
    channel
        .subscribe(PanicOnce {
            panicked: false,
            items: items.clone(),
        })
        .unwrap();

    // Act
    let first = catch_unwind(AssertUnwindSafe(|| emitter.emit(1)));
    let second = emitter.emit(2);

    // Assert
    assert!(first.is_err());
    assert_eq!(second.unwrap(), Emission::Delivered);
    assert_eq!(*items.lock(), vec![2]);
}
