// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lazy publisher that only reports completion or failure.

use crate::one_shot::OneShot;
use crate::subscription::Subscription;
use alloc::boxed::Box;
use alloc::sync::Arc;
use backflow_error::{BackflowError, Result};

pub trait CompletableObserver: Send {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        let _ = subscription;
    }

    fn on_complete(&mut self);

    fn on_error(&mut self, error: BackflowError);
}

pub struct CompletableEmitter {
    shot: Arc<OneShot<dyn CompletableObserver>>,
}

impl CompletableEmitter {
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

/// Cold publisher of a completion-or-error outcome.
#[derive(Clone)]
pub struct Completable {
    source: Arc<dyn Fn(CompletableEmitter) + Send + Sync>,
}

impl Completable {
    pub fn create<F>(source: F) -> Self
    where
        F: Fn(CompletableEmitter) + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: CompletableObserver + 'static,
    {
        let observer: Box<dyn CompletableObserver> = Box::new(observer);
        let (shot, subscription) =
            OneShot::attach(observer, |observer, subscription| observer.on_subscribe(subscription));

        (self.source)(CompletableEmitter { shot });
        subscription
    }
}
