// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Backflow
//!
//! A bounded, demand-driven event pipeline.
//!
//! ## Overview
//!
//! A producer pushes items into a [`channel`]; a consumer pulls them by
//! requesting demand through its [`Subscription`]. The producer can never
//! deliver more items than were requested. What happens to the excess is a
//! per-channel [`ChannelConfig`]: fail with `NoDemand`, drop the newest item,
//! reject it once a bounded buffer is full, or buffer without limit.
//!
//! Between producer and consumer, stages from [`PublisherExt`] transform the
//! flow without breaking the demand contract, and cancellation travels from
//! the consumer back to the producer through every stage.
//! [`CompositeSubscription`] cancels groups of independent pipelines at once.
//!
//! ## Crates
//!
//! - `backflow-core`: channel, subscriptions, cancellation, single-shot publishers
//! - `backflow-stream`: pipeline stages and cold sources
//! - `backflow-exec`: tokio producer tasks and `futures::Stream` consumers
//! - `backflow-error`: the shared [`BackflowError`]
//!
//! ## Quick Start
//!
//! ```rust
//! use backflow::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let (emitter, channel) = channel::<u32>(ChannelConfig::bounded(2, OverflowPolicy::DropLatest));
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! let subscription = channel
//!     .map(|reading: u32| reading * 10)
//!     .subscribe(
//!         FnSubscriber::new(move |value: u32| sink.lock().unwrap().push(value))
//!             .with_initial_request(None),
//!     )
//!     .unwrap();
//!
//! // No demand yet: two readings are buffered, the third is dropped.
//! assert_eq!(emitter.emit(1).unwrap(), Emission::Buffered);
//! assert_eq!(emitter.emit(2).unwrap(), Emission::Buffered);
//! assert_eq!(emitter.emit(3).unwrap(), Emission::Dropped);
//!
//! subscription.request(10).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
//! ```

pub use backflow_core::{
    channel, BackflowError, CancellationFlag, Channel, ChannelConfig, Completable,
    CompletableEmitter, CompletableObserver, CompositeSubscription, Emission, Emitter, FlagState,
    FnSubscriber, Maybe, MaybeEmitter, MaybeObserver, OverflowPolicy, Publisher, Result, Signal,
    Single, SingleEmitter, SingleObserver, StreamItem, Subscriber, Subscription,
    SubscriptionControl, UNBOUNDED,
};
pub use backflow_error::IntoUpstream;
#[cfg(feature = "runtime-tokio")]
pub use backflow_exec::{cancel_after, spawn_producer};
pub use backflow_exec::{SignalStream, SignalStreamExt};
pub use backflow_stream::{from_iter, just, range, PublisherExt};

/// Prelude module for convenient imports
pub mod prelude {
    pub use backflow_core::{
        channel, BackflowError, ChannelConfig, CompositeSubscription, Emission, FnSubscriber,
        OverflowPolicy, Publisher, Subscriber, Subscription,
    };
    pub use backflow_exec::SignalStreamExt;
    pub use backflow_stream::{from_iter, just, range, PublisherExt};
}
