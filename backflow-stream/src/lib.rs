// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Pipeline stages and cold sources on top of [`backflow_core`].
//!
//! Every stage is itself a [`Publisher`](backflow_core::Publisher), so stages
//! chain: the consumer's demand travels upstream through each stage and items
//! travel downstream, never more than were requested.
//!
//! ## Stages
//!
//! - **[`map`](PublisherExt::map)**: one output per input, demand forwarded unchanged
//! - **[`try_map`](PublisherExt::try_map)**: fallible map; the first error cancels upstream
//! - **[`filter`](PublisherExt::filter)**: each rejected item requests one replacement upstream
//! - **[`do_on_cancel`](PublisherExt::do_on_cancel)**: side effect on the first cancellation
//!
//! A stage accepts a single subscriber; subscribing it again fails with
//! `AlreadySubscribed`.
//!
//! ## Sources
//!
//! [`just`], [`range`] and [`from_iter`] are cold: each subscription gets a
//! fresh channel that pulls from its own copy of the iterator as demand arrives.
//!
//! ```
//! use backflow_core::{FnSubscriber, Publisher};
//! use backflow_stream::{just, PublisherExt};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! just(vec![1, 2, 3, 4])
//!     .filter(|n: &i32| n % 2 == 0)
//!     .map(|n: i32| n * 100)
//!     .subscribe(FnSubscriber::new(move |n: i32| sink.lock().unwrap().push(n)))
//!     .unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![200, 400]);
//! ```

#[macro_use]
mod logging;

pub mod do_on_cancel;
pub mod filter;
pub mod map;
pub mod publisher_ext;
pub mod source;
mod stage;
pub mod try_map;

pub use self::do_on_cancel::DoOnCancel;
pub use self::filter::Filter;
pub use self::map::Map;
pub use self::publisher_ext::PublisherExt;
pub use self::source::{from_iter, just, range, IterSource};
pub use self::try_map::TryMap;
