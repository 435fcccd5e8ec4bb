// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core primitives of the backflow pipeline.
//!
//! - [`channel`]: the demand-driven signal channel and its [`Emitter`]
//! - [`Subscriber`] / [`Publisher`]: the consumer and producer contracts
//! - [`Subscription`]: the consumer's handle to request demand and cancel
//! - [`CancellationFlag`]: the monotonic tri-state flag shared by both sides
//! - [`CompositeSubscription`]: cancels a group of subscriptions at once
//! - [`Single`], [`Maybe`], [`Completable`]: single-shot result publishers

extern crate alloc;

#[macro_use]
mod logging;

pub mod cancellation_flag;
pub mod channel;
pub mod completable;
pub mod composite;
pub mod demand;
pub mod maybe;
mod one_shot;
pub mod signal;
pub mod single;
pub mod stream_item;
pub mod subscriber;
pub mod subscription;

pub use self::cancellation_flag::{CancellationFlag, FlagState};
pub use self::channel::{channel, Channel, ChannelConfig, Emission, Emitter, OverflowPolicy};
pub use self::completable::{Completable, CompletableEmitter, CompletableObserver};
pub use self::composite::CompositeSubscription;
pub use self::demand::{DemandCounter, UNBOUNDED};
pub use self::maybe::{Maybe, MaybeEmitter, MaybeObserver};
pub use self::signal::Signal;
pub use self::single::{Single, SingleEmitter, SingleObserver};
pub use self::stream_item::StreamItem;
pub use self::subscriber::{FnSubscriber, Publisher, Subscriber};
pub use self::subscription::{Subscription, SubscriptionControl};
pub use backflow_error::{BackflowError, Result};
