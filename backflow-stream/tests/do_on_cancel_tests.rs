// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{channel, ChannelConfig, Emission, Publisher};
use backflow_stream::{range, PublisherExt};
use backflow_test_utils::RecordingSubscriber;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_hook(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
    let counter = counter.clone();
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_hook_runs_once_then_cancels_upstream() {
    // Arrange
    let hooks = Arc::new(AtomicUsize::new(0));
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, _) = RecordingSubscriber::new();
    let subscription = channel
        .do_on_cancel(counting_hook(&hooks))
        .subscribe(subscriber)
        .unwrap();

    // Act
    subscription.cancel();
    subscription.cancel();

    // Assert
    assert_eq!(hooks.load(Ordering::SeqCst), 1);
    assert!(subscription.is_cancelled());
    assert_eq!(emitter.emit(1).unwrap(), Emission::Cancelled);
}

#[test]
fn test_hook_runs_when_cancelled_from_on_next() {
    // Arrange
    let hooks = Arc::new(AtomicUsize::new(0));
    let (subscriber, recorder) = RecordingSubscriber::new();

    // Act
    range(0, 100)
        .do_on_cancel(counting_hook(&hooks))
        .subscribe(subscriber.with_initial_request(50).cancel_after(3))
        .unwrap();

    // Assert
    assert_eq!(hooks.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.items(), vec![0, 1, 2]);
    assert_eq!(recorder.terminal_count(), 0);
}

#[test]
fn test_hook_not_run_on_completion() {
    let hooks = Arc::new(AtomicUsize::new(0));
    let (subscriber, recorder) = RecordingSubscriber::new();

    range(0, 2)
        .do_on_cancel(counting_hook(&hooks))
        .subscribe(subscriber.with_initial_request(5))
        .unwrap();

    assert!(recorder.is_completed());
    assert_eq!(hooks.load(Ordering::SeqCst), 0);
}

#[test]
fn test_demand_passes_through_hooked_subscription() {
    let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
    let (subscriber, recorder) = RecordingSubscriber::new();
    let subscription = channel
        .do_on_cancel(|| {})
        .subscribe(subscriber)
        .unwrap();

    subscription.request(2).unwrap();
    emitter.emit(1).unwrap();
    emitter.emit(2).unwrap();

    assert_eq!(recorder.items(), vec![1, 2]);
    assert!(subscription.request(0).is_err());
}
