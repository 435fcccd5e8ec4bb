// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_error::{BackflowError, Result};
use parking_lot::Mutex;

/// Upstream publisher plus operator state, handed to the first subscriber only.
pub(crate) struct StageSlot<P, F> {
    slot: Mutex<Option<(P, F)>>,
}

impl<P, F> StageSlot<P, F> {
    pub(crate) fn new(upstream: P, operator: F) -> Self {
        Self {
            slot: Mutex::new(Some((upstream, operator))),
        }
    }

    pub(crate) fn take(&self) -> Result<(P, F)> {
        self.slot.lock().take().ok_or_else(|| {
            debug!("stage rejected a second subscriber");
            BackflowError::AlreadySubscribed
        })
    }
}
