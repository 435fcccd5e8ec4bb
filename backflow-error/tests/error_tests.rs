// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_error::{BackflowError, IntoUpstream, Result};
use std::error::Error;
use std::io;

#[test]
fn test_error_display() {
    let err = BackflowError::invalid_demand(0);
    assert_eq!(
        err.to_string(),
        "Invalid demand: requested 0 items, expected at least 1"
    );

    let err = BackflowError::buffer_overflow(2);
    assert_eq!(
        err.to_string(),
        "Buffer overflow: capacity of 2 items exhausted"
    );

    let err = BackflowError::stream_error("processing failed");
    assert_eq!(err.to_string(), "Stream processing error: processing failed");
}

#[test]
fn test_protocol_errors_are_classified() {
    assert!(BackflowError::invalid_demand(0).is_protocol());
    assert!(BackflowError::NoDemand.is_protocol());
    assert!(BackflowError::AlreadySubscribed.is_protocol());
    assert!(BackflowError::DoubleTermination.is_protocol());
    assert!(BackflowError::buffer_overflow(1).is_protocol());

    assert!(!BackflowError::NoDemand.is_upstream());
}

#[test]
fn test_upstream_errors_are_classified() {
    let err = BackflowError::upstream(io::Error::other("disk gone"));
    assert!(err.is_upstream());
    assert!(!err.is_protocol());

    assert!(BackflowError::stream_error("boom").is_upstream());
}

#[test]
fn test_upstream_keeps_source() {
    let err = io::Error::other("disk gone").into_upstream();

    let source = err.source().expect("upstream error exposes its source");
    assert_eq!(source.to_string(), "disk gone");
    assert_eq!(err.to_string(), "Upstream error: disk gone");
}

#[test]
fn test_clone_upstream_keeps_message() {
    let err = BackflowError::upstream(io::Error::other("disk gone"));

    let cloned = err.clone();

    match cloned {
        BackflowError::StreamProcessing { context } => assert_eq!(context, "disk gone"),
        other => panic!("unexpected clone: {other:?}"),
    }
}

#[test]
fn test_clone_preserves_protocol_variants() {
    assert!(matches!(
        BackflowError::invalid_demand(0).clone(),
        BackflowError::InvalidDemand { requested: 0 }
    ));
    assert!(matches!(
        BackflowError::buffer_overflow(4).clone(),
        BackflowError::BufferOverflow { capacity: 4 }
    ));
    assert!(matches!(
        BackflowError::DoubleTermination.clone(),
        BackflowError::DoubleTermination
    ));
}

#[test]
fn test_result_alias_with_question_mark() -> anyhow::Result<()> {
    fn checked(n: u64) -> Result<u64> {
        if n == 0 {
            return Err(BackflowError::invalid_demand(n));
        }
        Ok(n)
    }

    assert_eq!(checked(3)?, 3);
    assert!(checked(0).is_err());
    Ok(())
}
