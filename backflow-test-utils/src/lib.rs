// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for the backflow workspace.
//!
//! - [`recording`]: a subscriber that records every signal it receives, with
//!   knobs for initial demand, per-item replenishment and self-cancellation
//! - [`helpers`]: async assertion helpers for streams and eventually-true conditions
//! - [`injected_error`]: a ready-made upstream error
//!
//! # Example
//!
//! ```rust
//! use backflow_core::{channel, ChannelConfig, Publisher, Signal};
//! use backflow_test_utils::RecordingSubscriber;
//!
//! let (emitter, channel) = channel::<i32>(ChannelConfig::fail_fast());
//! let (subscriber, recorder) = RecordingSubscriber::new();
//! channel.subscribe(subscriber.with_initial_request(2)).unwrap();
//!
//! emitter.emit(1).unwrap();
//! emitter.complete().unwrap();
//!
//! assert_eq!(recorder.signals(), vec![Signal::Item(1), Signal::Complete]);
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod recording;

use backflow_error::BackflowError;

pub use helpers::{assert_no_element_emitted, eventually};
pub use recording::{Recorder, RecordingSubscriber};

/// Upstream error used to exercise error propagation.
pub fn injected_error(message: &str) -> BackflowError {
    BackflowError::upstream(std::io::Error::other(message.to_string()))
}
