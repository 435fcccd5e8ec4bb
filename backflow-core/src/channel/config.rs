// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// What a channel does with an item that exceeds demand and buffer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Discard the newly emitted item and keep what is already staged.
    DropLatest,
    /// Reject the item. Without a buffer this is the fail-fast `NoDemand`
    /// contract; with one it is `BufferOverflow`.
    #[default]
    Error,
    /// Stage every item regardless of demand. The capacity is ignored.
    UnboundedBuffer,
}

/// Construction parameters of a channel.
///
/// The default is the pure synchronous contract: no buffer, and emitting
/// without demand fails with `NoDemand`.
///
/// ```
/// use backflow_core::{ChannelConfig, OverflowPolicy};
///
/// let config = ChannelConfig::bounded(2, OverflowPolicy::DropLatest);
/// assert_eq!(config.capacity, Some(2));
/// assert!(config.is_buffering());
/// assert!(!ChannelConfig::default().is_buffering());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelConfig {
    pub policy: OverflowPolicy,
    /// Items that may be staged beyond outstanding demand.
    pub capacity: Option<usize>,
}

impl ChannelConfig {
    #[must_use]
    pub const fn new(policy: OverflowPolicy, capacity: Option<usize>) -> Self {
        Self { policy, capacity }
    }

    #[must_use]
    pub const fn fail_fast() -> Self {
        Self::new(OverflowPolicy::Error, None)
    }

    #[must_use]
    pub const fn bounded(capacity: usize, policy: OverflowPolicy) -> Self {
        Self::new(policy, Some(capacity))
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(OverflowPolicy::UnboundedBuffer, None)
    }

    /// `true` when items may be staged without demand.
    #[must_use]
    pub const fn is_buffering(&self) -> bool {
        match self.policy {
            OverflowPolicy::UnboundedBuffer => true,
            _ => matches!(self.capacity, Some(capacity) if capacity > 0),
        }
    }

    pub(crate) const fn has_room(&self, buffered: usize) -> bool {
        match self.policy {
            OverflowPolicy::UnboundedBuffer => true,
            _ => match self.capacity {
                Some(capacity) => buffered < capacity,
                None => false,
            },
        }
    }
}
