// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Credit counter for consumer demand.

use backflow_error::{BackflowError, Result};
use core::sync::atomic::{AtomicU64, Ordering};

/// Demand value meaning "no limit". Requests saturate at this value and it is
/// never decremented.
pub const UNBOUNDED: u64 = u64::MAX;

/// Atomic, saturating demand counter.
///
/// Incremented only by [`add`](Self::add), decremented by one per delivered item
/// through [`try_take_one`](Self::try_take_one).
#[derive(Debug, Default)]
pub struct DemandCounter {
    value: AtomicU64,
}

impl DemandCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Add `n` units of credit and return the new total.
    ///
    /// # Errors
    ///
    /// Returns [`BackflowError::InvalidDemand`] when `n` is zero; the counter is
    /// left untouched.
    pub fn add(&self, n: u64) -> Result<u64> {
        if n == 0 {
            return Err(BackflowError::invalid_demand(n));
        }

        let previous = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(n))
            })
            .unwrap_or_else(|current| current);

        Ok(previous.saturating_add(n))
    }

    /// Consume one unit of credit, returning `false` when none is left.
    pub fn try_take_one(&self) -> bool {
        self.value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| match current {
                0 => None,
                UNBOUNDED => Some(UNBOUNDED),
                n => Some(n - 1),
            })
            .is_ok()
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    pub fn is_unbounded(&self) -> bool {
        self.get() == UNBOUNDED
    }
}
