// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{channel, BackflowError, ChannelConfig, Emission, StreamItem};
use backflow_exec::SignalStreamExt;
use backflow_stream::{range, PublisherExt};
use backflow_test_utils::{assert_no_element_emitted, eventually, injected_error};
use futures::StreamExt;

#[tokio::test]
async fn test_stream_yields_all_items_then_ends() -> anyhow::Result<()> {
    // Arrange
    let stream = range(0, 100).map(|n: i64| n * 2).into_signal_stream(8)?;

    // Act
    let values: Vec<i64> = stream.map(StreamItem::unwrap).collect().await;

    // Assert
    assert_eq!(values, (0..100).map(|n| n * 2).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn test_prefetch_bounds_outstanding_demand() {
    // Arrange
    let (emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
    let mut stream = channel.into_signal_stream(4).unwrap();

    // Act & Assert: four items fit, the fifth has no demand
    assert_eq!(emitter.requested(), 4);
    for item in 0..4 {
        assert_eq!(emitter.emit(item).unwrap(), Emission::Delivered);
    }
    assert!(matches!(emitter.emit(4), Err(BackflowError::NoDemand)));

    // Three consumed items (three quarters of four) trigger a request for three more
    for expected in 0..3 {
        assert_eq!(stream.next().await.unwrap().unwrap(), expected);
    }
    assert_eq!(emitter.requested(), 3);
}

#[tokio::test]
async fn test_error_is_yielded_once_and_ends_stream() {
    // Arrange
    let (emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
    let mut stream = channel.into_signal_stream(2).unwrap();
    emitter.emit(1).unwrap();
    emitter.fail(injected_error("bad frame")).unwrap();

    // Act
    let first = stream.next().await;
    let second = stream.next().await;
    let third = stream.next().await;

    // Assert
    assert_eq!(first.unwrap().unwrap(), 1);
    assert!(second.is_some_and(|item| item.is_error()));
    assert!(third.is_none());
}

#[tokio::test]
async fn test_dropping_stream_cancels_upstream() {
    let (emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
    let stream = channel.into_signal_stream(16).unwrap();

    drop(stream);

    assert!(emitter.is_cancelled());
    assert_eq!(emitter.emit(1).unwrap(), Emission::Cancelled);
}

#[tokio::test]
async fn test_stream_waits_for_producer() {
    let (emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
    let mut stream = channel.into_signal_stream(2).unwrap();

    assert_no_element_emitted(&mut stream, 50).await;
    emitter.emit(9).unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), 9);
    assert!(!emitter.is_cancelled());
}

#[tokio::test]
async fn test_zero_prefetch_is_rejected() {
    let result = range(0, 1).into_signal_stream(0);

    assert!(matches!(
        result,
        Err(BackflowError::InvalidDemand { requested: 0 })
    ));
}

#[tokio::test]
async fn test_subscription_handle_cancels() {
    let (emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
    let mut stream = channel.into_signal_stream(1).unwrap();

    stream.subscription().cancel();
    eventually(100, || emitter.is_cancelled()).await;

    // The cancelled channel released its subscriber, which closes the stream.
    assert!(stream.next().await.is_none());
}
