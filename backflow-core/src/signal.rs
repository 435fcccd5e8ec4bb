// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_error::BackflowError;

/// One event on a channel: an item or one of the two terminal signals.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    Item(T),
    Complete,
    Error(BackflowError),
}

impl<T: PartialEq> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Signal::Item(a), Signal::Item(b)) => a == b,
            (Signal::Complete, Signal::Complete) => true,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> Signal<T> {
    pub const fn is_item(&self) -> bool {
        matches!(self, Signal::Item(_))
    }

    /// Returns `true` for `Complete` and `Error`.
    pub const fn is_terminal(&self) -> bool {
        !self.is_item()
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Signal::Error(_))
    }

    /// Converts to `Option<T>`, discarding terminal signals.
    pub fn item(self) -> Option<T> {
        match self {
            Signal::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Maps the item, leaving terminal signals unchanged.
    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Signal::Item(item) => Signal::Item(f(item)),
            Signal::Complete => Signal::Complete,
            Signal::Error(e) => Signal::Error(e),
        }
    }
}
