// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Tri-state cancellation flag shared by the producer and consumer side of a channel.
//!
//! The state lives in a single atomic byte and only ever gains bits, so once a
//! cancellation has been requested it can never revert to [`FlagState::Active`].

use core::sync::atomic::{AtomicU8, Ordering};

const CANCEL_REQUESTED: u8 = 0b01;
const TERMINATED: u8 = 0b10;

/// Observable state of a [`CancellationFlag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    /// Neither cancelled nor terminated.
    Active,
    /// The consumer asked the producer to stop.
    CancelRequested,
    /// A terminal signal was delivered or cancellation was acknowledged.
    Terminated,
}

/// Monotonic, lock-free cancellation flag.
///
/// # Example
///
/// ```
/// use backflow_core::{CancellationFlag, FlagState};
///
/// let flag = CancellationFlag::new();
/// assert!(flag.request_cancel());
/// assert!(!flag.request_cancel());
/// assert_eq!(flag.state(), FlagState::CancelRequested);
///
/// flag.terminate();
/// assert_eq!(flag.state(), FlagState::Terminated);
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct CancellationFlag {
    bits: AtomicU8,
}

impl CancellationFlag {
    /// Create an active flag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
        }
    }

    /// Request cancellation.
    ///
    /// Returns `true` only for the call that moved the flag out of
    /// [`FlagState::Active`]; later calls, or calls after termination, return `false`.
    pub fn request_cancel(&self) -> bool {
        self.bits.fetch_or(CANCEL_REQUESTED, Ordering::AcqRel) == 0
    }

    /// Mark the flag terminated. Returns `true` on the first call.
    pub fn terminate(&self) -> bool {
        self.bits.fetch_or(TERMINATED, Ordering::AcqRel) & TERMINATED == 0
    }

    /// `true` once cancellation was requested, even if the flag has since terminated.
    pub fn is_cancelled(&self) -> bool {
        self.bits.load(Ordering::Acquire) & CANCEL_REQUESTED != 0
    }

    pub fn is_terminated(&self) -> bool {
        self.bits.load(Ordering::Acquire) & TERMINATED != 0
    }

    pub fn state(&self) -> FlagState {
        let bits = self.bits.load(Ordering::Acquire);
        if bits & TERMINATED != 0 {
            FlagState::Terminated
        } else if bits & CANCEL_REQUESTED != 0 {
            FlagState::CancelRequested
        } else {
            FlagState::Active
        }
    }
}
