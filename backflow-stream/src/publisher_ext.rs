// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{DoOnCancel, Filter, Map, TryMap};
use backflow_core::{Publisher, Result};

/// Extension trait adding pipeline stages to every [`Publisher`].
///
/// Each method consumes the upstream publisher and returns a stage that is
/// itself a publisher accepting one subscriber.
pub trait PublisherExt<T>: Publisher<T> + Sized {
    /// Transform every item with `f`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backflow_core::{FnSubscriber, Publisher};
    /// use backflow_stream::{range, PublisherExt};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    ///
    /// range(1, 3)
    ///     .map(|n: i64| n.to_string())
    ///     .subscribe(FnSubscriber::new(move |s: String| sink.lock().unwrap().push(s)))
    ///     .unwrap();
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec!["1", "2", "3"]);
    /// ```
    fn map<U, F>(self, f: F) -> Map<Self, T, F>
    where
        F: FnMut(T) -> U + Send + 'static,
    {
        Map::new(self, f)
    }

    /// Transform every item with a fallible `f`.
    ///
    /// On the first `Err` the upstream subscription is cancelled and the error
    /// becomes the downstream terminal signal.
    fn try_map<U, F>(self, f: F) -> TryMap<Self, T, F>
    where
        F: FnMut(T) -> Result<U> + Send + 'static,
    {
        TryMap::new(self, f)
    }

    /// Keep only items matching `predicate`.
    ///
    /// Each rejected item is replaced by a `request(1)` upstream, so a
    /// downstream `request(n)` eventually yields `n` matching items or the
    /// terminal signal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backflow_core::{FnSubscriber, Publisher};
    /// use backflow_stream::{just, PublisherExt};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    ///
    /// just(vec![1, 2, 3, 4, 5, 6])
    ///     .filter(|n: &i32| n % 2 == 0)
    ///     .subscribe(
    ///         FnSubscriber::new(move |n: i32| sink.lock().unwrap().push(n))
    ///             .with_initial_request(Some(2)),
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![2, 4]);
    /// ```
    fn filter<F>(self, predicate: F) -> Filter<Self, T, F>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        Filter::new(self, predicate)
    }

    /// Run `hook` once, on the first cancellation coming from downstream.
    fn do_on_cancel<F>(self, hook: F) -> DoOnCancel<Self, T, F>
    where
        F: FnOnce() + Send + 'static,
    {
        DoOnCancel::new(self, hook)
    }
}

impl<P, T> PublisherExt<T> for P where P: Publisher<T> {}
