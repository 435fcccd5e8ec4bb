// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Scheduling glue between backflow channels and async tasks.
//!
//! - [`spawn_producer`]: run an async producer on its own tokio task
//! - [`SignalStreamExt::into_signal_stream`]: consume any publisher as a
//!   `futures::Stream`, with bounded prefetch and cancel-on-drop
//! - [`cancel_after`]: cancel a subscription once a deadline passes

#[macro_use]
mod logging;

#[cfg(feature = "runtime-tokio")]
pub mod cancel_after;
pub mod signal_stream;
#[cfg(feature = "runtime-tokio")]
pub mod spawn_producer;

#[cfg(feature = "runtime-tokio")]
pub use cancel_after::cancel_after;
pub use signal_stream::{SignalStream, SignalStreamExt};
#[cfg(feature = "runtime-tokio")]
pub use spawn_producer::spawn_producer;
