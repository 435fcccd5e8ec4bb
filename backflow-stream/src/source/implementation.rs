// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{Emission, Emitter};
use core::iter::Peekable;
use core::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;

/// Moves items from an iterator into a channel as demand allows.
///
/// `drain` is called from the channel's request hook, possibly re-entrantly
/// from inside the subscriber. The work-in-progress counter makes a single
/// caller own the iterator while the others only record that more demand
/// arrived.
pub(crate) struct Pump<I: Iterator> {
    emitter: Emitter<I::Item>,
    items: Mutex<Option<Peekable<I>>>,
    wip: AtomicUsize,
}

impl<I> Pump<I>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    pub(crate) fn new(emitter: Emitter<I::Item>, items: I) -> Self {
        Self {
            emitter,
            items: Mutex::new(Some(items.peekable())),
            wip: AtomicUsize::new(0),
        }
    }

    pub(crate) fn emitter(&self) -> &Emitter<I::Item> {
        &self.emitter
    }

    pub(crate) fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            self.pump();

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn pump(&self) {
        let mut slot = self.items.lock();
        let Some(items) = slot.as_mut() else {
            return;
        };

        loop {
            if self.emitter.is_cancelled() {
                trace!("source cancelled, releasing iterator");
                *slot = None;
                return;
            }

            if items.peek().is_none() {
                *slot = None;
                if let Err(error) = self.emitter.complete() {
                    warn!("source completion rejected: {}", error);
                }
                return;
            }

            if self.emitter.requested() == 0 {
                return;
            }

            let Some(item) = items.next() else {
                continue;
            };
            match self.emitter.emit(item) {
                Ok(Emission::Delivered | Emission::Buffered) => {}
                Ok(emission) => {
                    trace!("source stopped after {:?}", emission);
                    *slot = None;
                    return;
                }
                Err(error) => {
                    warn!("source emission rejected: {}", error);
                    *slot = None;
                    return;
                }
            }
        }
    }
}
