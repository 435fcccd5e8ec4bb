// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lazy publisher of at most one value.

use crate::one_shot::OneShot;
use crate::subscription::Subscription;
use alloc::boxed::Box;
use alloc::sync::Arc;
use backflow_error::{BackflowError, Result};

/// Receiver of a [`Maybe`]: exactly one of the three terminal callbacks runs.
pub trait MaybeObserver<T>: Send {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        let _ = subscription;
    }

    fn on_success(&mut self, value: T);

    fn on_complete(&mut self);

    fn on_error(&mut self, error: BackflowError);
}

pub struct MaybeEmitter<T> {
    shot: Arc<OneShot<dyn MaybeObserver<T>>>,
}

impl<T: 'static> MaybeEmitter<T> {
    /// # Errors
    ///
    /// Returns `DoubleTermination` if a result was already emitted.
    pub fn on_success(&self, value: T) -> Result<()> {
        if let Some(mut observer) = self.shot.finish()? {
            observer.on_success(value);
        }
        Ok(())
    }

    /// Finish without a value.
    ///
    /// # Errors
    ///
    /// Returns `DoubleTermination` if a result was already emitted.
    pub fn on_complete(&self) -> Result<()> {
        if let Some(mut observer) = self.shot.finish()? {
            observer.on_complete();
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

/// Cold publisher of zero or one value.
pub struct Maybe<T> {
    source: Arc<dyn Fn(MaybeEmitter<T>) + Send + Sync>,
}

impl<T: Send + 'static> Maybe<T> {
    pub fn create<F>(source: F) -> Self
    where
        F: Fn(MaybeEmitter<T>) + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn empty() -> Self {
        Self::create(|emitter| {
            let _ = emitter.on_complete();
        })
    }

    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: MaybeObserver<T> + 'static,
    {
        let observer: Box<dyn MaybeObserver<T>> = Box::new(observer);
        let (shot, subscription) =
            OneShot::attach(observer, |observer, subscription| observer.on_subscribe(subscription));

        (self.source)(MaybeEmitter { shot });
        subscription
    }
}

impl<T> Clone for Maybe<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}
