// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{BackflowError, Emitter, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Run an async producer for `emitter` on a new tokio task.
///
/// The producer owns the emission side: it emits, and it completes the
/// channel when done. If it returns `Err`, the error is sent as the channel's
/// error signal, unless the consumer already cancelled or the producer
/// already sent a terminal signal itself. A producer that returns `Ok`
/// without completing fails the channel when its emitter is dropped.
///
/// # Examples
///
/// ```rust
/// use backflow_core::{channel, ChannelConfig, FnSubscriber, Publisher};
/// use backflow_exec::spawn_producer;
/// use std::sync::{Arc, Mutex};
///
/// # #[tokio::main]
/// # async fn main() {
/// let (emitter, channel) = channel::<u32>(ChannelConfig::fail_fast());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// channel
///     .subscribe(FnSubscriber::new(move |n: u32| sink.lock().unwrap().push(n)))
///     .unwrap();
///
/// spawn_producer(emitter, |emitter| async move {
///     for n in 0..3 {
///         emitter.emit_wait(n).await;
///     }
///     emitter.complete()
/// })
/// .await
/// .unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
/// # }
/// ```
pub fn spawn_producer<T, F, Fut>(emitter: Emitter<T>, producer: F) -> JoinHandle<()>
where
    T: Send + 'static,
    F: FnOnce(Arc<Emitter<T>>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let emitter = Arc::new(emitter);
    let task = producer(Arc::clone(&emitter));

    tokio::spawn(async move {
        if let Err(error) = task.await {
            report_failure(&emitter, error);
        }
    })
}

fn report_failure<T: Send + 'static>(emitter: &Emitter<T>, error: BackflowError) {
    if emitter.is_cancelled() {
        debug!("producer failed after cancellation: {}", error);
    } else {
        error!("producer failed: {}", error);
    }

    // Under cancellation this only acknowledges it; nothing is delivered.
    if let Err(rejected) = emitter.fail(error) {
        debug!("producer error not delivered: {}", rejected);
    }
}
