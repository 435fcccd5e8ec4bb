// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lazy publisher of exactly one value or an error.

use crate::one_shot::OneShot;
use crate::subscription::Subscription;
use alloc::boxed::Box;
use alloc::sync::Arc;
use backflow_error::{BackflowError, Result};

/// Receiver of a [`Single`].
pub trait SingleObserver<T>: Send {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        let _ = subscription;
    }

    fn on_success(&mut self, value: T);

    fn on_error(&mut self, error: BackflowError);
}

/// Producer handle passed to the function given to [`Single::create`].
pub struct SingleEmitter<T> {
    shot: Arc<OneShot<dyn SingleObserver<T>>>,
}

impl<T: 'static> SingleEmitter<T> {
    /// # Errors
    ///
    /// Returns `DoubleTermination` if a result was already emitted.
    pub fn on_success(&self, value: T) -> Result<()> {
        if let Some(mut observer) = self.shot.finish()? {
            observer.on_success(value);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DoubleTermination` if a result was already emitted.
    pub fn on_error(&self, error: BackflowError) -> Result<()> {
        if let Some(mut observer) = self.shot.finish()? {
            observer.on_error(error);
        }
        Ok(())
    }

    pub fn is_cancelled(&self) -> bool {
        self.shot.is_cancelled()
    }
}

/// Cold single-value publisher. The create function runs once per subscription.
///
/// ```
/// use backflow_core::{BackflowError, Single, SingleObserver};
/// use std::sync::mpsc;
///
/// struct Report(mpsc::Sender<u32>);
///
/// impl SingleObserver<u32> for Report {
///     fn on_success(&mut self, value: u32) {
///         self.0.send(value).unwrap();
///     }
///
///     fn on_error(&mut self, _error: BackflowError) {}
/// }
///
/// let (tx, rx) = mpsc::channel();
/// let single = Single::create(|emitter| {
///     emitter.on_success(7).unwrap();
/// });
///
/// single.subscribe(Report(tx));
/// assert_eq!(rx.recv().unwrap(), 7);
/// ```
pub struct Single<T> {
    source: Arc<dyn Fn(SingleEmitter<T>) + Send + Sync>,
}

impl<T: Send + 'static> Single<T> {
    pub fn create<F>(source: F) -> Self
    where
        F: Fn(SingleEmitter<T>) + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |emitter| {
            // A fresh emitter cannot already be terminated.
            let _ = emitter.on_success(value.clone());
        })
    }

    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: SingleObserver<T> + 'static,
    {
        let observer: Box<dyn SingleObserver<T>> = Box::new(observer);
        let (shot, subscription) =
            OneShot::attach(observer, |observer, subscription| observer.on_subscribe(subscription));

        (self.source)(SingleEmitter { shot });
        subscription
    }
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}
