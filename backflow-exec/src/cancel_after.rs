// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::Subscription;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancel `subscription` once `timeout` has elapsed.
///
/// Abort the returned handle to disarm the deadline. Cancelling a subscription
/// that already finished has no effect.
pub fn cancel_after(subscription: Subscription, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        if !subscription.is_cancelled() {
            debug!("deadline of {:?} reached, cancelling", timeout);
            subscription.cancel();
        }
    })
}
