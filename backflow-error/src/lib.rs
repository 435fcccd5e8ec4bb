// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the backflow pipeline
//!
//! Two families of failures live in [`BackflowError`]:
//!
//! - **Protocol violations** (`InvalidDemand`, `NoDemand`, `AlreadySubscribed`,
//!   `DoubleTermination`, `BufferOverflow`) are returned synchronously to the
//!   caller that broke the demand or termination contract. They never travel
//!   through a channel and are never retried.
//! - **Data errors** (`Upstream`, `StreamProcessing`) are carried as the
//!   terminal `Error` signal of a channel and reach the consumer exactly once.
//!
//! # Examples
//!
//! ```
//! use backflow_error::{BackflowError, Result};
//!
//! fn request(n: u64) -> Result<()> {
//!     if n == 0 {
//!         return Err(BackflowError::invalid_demand(n));
//!     }
//!     Ok(())
//! }
//!
//! assert!(request(0).unwrap_err().is_protocol());
//! ```

/// Root error type for all backflow operations
#[derive(Debug, thiserror::Error)]
pub enum BackflowError {
    /// A consumer asked for zero items
    ///
    /// Demand must be strictly positive. The channel state is left untouched.
    #[error("Invalid demand: requested {requested} items, expected at least 1")]
    InvalidDemand {
        /// The rejected request
        requested: u64,
    },

    /// A producer emitted an item without outstanding demand
    ///
    /// Raised only by fail-fast channels. This is a programming error in the
    /// producer, distinct from the silent drop that follows cancellation.
    #[error("Item emitted without outstanding demand")]
    NoDemand,

    /// A publisher that accepts a single consumer was subscribed twice
    #[error("Publisher already has a subscriber")]
    AlreadySubscribed,

    /// A producer sent a second terminal signal
    #[error("Terminal signal already sent")]
    DoubleTermination,

    /// A bounded buffer with the `Error` overflow policy is full
    #[error("Buffer overflow: capacity of {capacity} items exhausted")]
    BufferOverflow {
        /// Configured buffer capacity
        capacity: usize,
    },

    /// Error raised by a producer or a user-supplied transform
    ///
    /// This is the payload of a channel's terminal `Error` signal.
    #[error("Upstream error: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Textual data error
    ///
    /// Also used when an `Upstream` error has to be cloned.
    #[error("Stream processing error: {context}")]
    StreamProcessing {
        /// Description of what went wrong
        context: String,
    },
}

impl BackflowError {
    /// Create an invalid demand error for the given request
    #[must_use]
    pub const fn invalid_demand(requested: u64) -> Self {
        Self::InvalidDemand { requested }
    }

    /// Create a buffer overflow error for the given capacity
    #[must_use]
    pub const fn buffer_overflow(capacity: usize) -> Self {
        Self::BufferOverflow { capacity }
    }

    /// Wrap a producer or transform error
    pub fn upstream(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Upstream(Box::new(error))
    }

    /// Create a textual stream processing error
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessing {
            context: context.into(),
        }
    }

    /// Check if this error is a violation of the demand or termination protocol
    ///
    /// Protocol violations are surfaced at the call site and are never
    /// delivered as signals.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::InvalidDemand { .. }
                | Self::NoDemand
                | Self::AlreadySubscribed
                | Self::DoubleTermination
                | Self::BufferOverflow { .. }
        )
    }

    /// Check if this error is a data error carried through a channel
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::StreamProcessing { .. })
    }
}

/// Specialized Result type for backflow operations
pub type Result<T> = std::result::Result<T, BackflowError>;

/// Extension trait for converting foreign errors into `BackflowError::Upstream`
pub trait IntoUpstream {
    /// Wrap this error as an upstream data error
    fn into_upstream(self) -> BackflowError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoUpstream for E {
    fn into_upstream(self) -> BackflowError {
        BackflowError::upstream(self)
    }
}

impl Clone for BackflowError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidDemand { requested } => Self::InvalidDemand {
                requested: *requested,
            },
            Self::NoDemand => Self::NoDemand,
            Self::AlreadySubscribed => Self::AlreadySubscribed,
            Self::DoubleTermination => Self::DoubleTermination,
            Self::BufferOverflow { capacity } => Self::BufferOverflow {
                capacity: *capacity,
            },
            // The boxed source cannot be cloned, keep its message
            Self::Upstream(e) => Self::StreamProcessing {
                context: e.to_string(),
            },
            Self::StreamProcessing { context } => Self::StreamProcessing {
                context: context.clone(),
            },
        }
    }
}
