// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::cancellation_flag::{CancellationFlag, FlagState};
use crate::channel::config::{ChannelConfig, OverflowPolicy};
use crate::channel::Emission;
use crate::demand::DemandCounter;
use crate::subscriber::Subscriber;
use crate::subscription::{Subscription, SubscriptionControl};
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use backflow_error::{BackflowError, Result};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use event_listener::{Event, EventListener};
use parking_lot::Mutex;

type BoxSubscriber<T> = Box<dyn Subscriber<T>>;
type CancelHook = Box<dyn FnOnce() + Send>;
type RequestHook = Arc<dyn Fn() + Send + Sync>;

enum Terminal {
    Complete,
    Error(BackflowError),
}

struct Staging<T> {
    items: VecDeque<T>,
    terminal: Option<Terminal>,
}

enum Step<T> {
    Item(T),
    Terminal(Terminal),
    Idle,
}

/// Outcome of trying to stage an item without applying the overflow policy.
pub(crate) enum Admission<T> {
    Accepted(Emission),
    Full(T),
}

/// Releases drain ownership when a subscriber callback unwinds.
struct WipReset<'a>(&'a AtomicUsize);

impl Drop for WipReset<'_> {
    fn drop(&mut self) {
        self.0.store(0, Ordering::Release);
    }
}

/// Shared state of one channel.
///
/// Every delivery to the subscriber happens inside [`drain`](Self::drain),
/// which is guarded by a work-in-progress counter: the first caller becomes
/// the owner and loops until no other caller has signalled missed work.
/// Re-entrant calls from subscriber callbacks therefore never touch the
/// subscriber lock.
pub(crate) struct ChannelCore<T> {
    config: ChannelConfig,
    flag: CancellationFlag,
    demand: DemandCounter,
    wip: AtomicUsize,
    subscribed: AtomicBool,
    done: AtomicBool,
    staging: Mutex<Staging<T>>,
    subscriber: Mutex<Option<BoxSubscriber<T>>>,
    on_cancel: Mutex<Option<CancelHook>>,
    on_request: Mutex<Option<RequestHook>>,
    space: Event,
}

impl<T> ChannelCore<T> {
    pub(crate) fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            flag: CancellationFlag::new(),
            demand: DemandCounter::new(),
            wip: AtomicUsize::new(0),
            subscribed: AtomicBool::new(false),
            done: AtomicBool::new(false),
            staging: Mutex::new(Staging {
                items: VecDeque::new(),
                terminal: None,
            }),
            subscriber: Mutex::new(None),
            on_cancel: Mutex::new(None),
            on_request: Mutex::new(None),
            space: Event::new(),
        }
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }

    pub(crate) fn config(&self) -> ChannelConfig {
        self.config
    }

    /// Stage `item` if demand or buffer space allows, otherwise hand it back.
    pub(crate) fn admit(&self, item: T) -> Admission<T> {
        let emission = {
            let mut staging = self.staging.lock();
            if self.done.load(Ordering::Acquire) {
                return Admission::Accepted(Emission::Ignored);
            }
            if self.flag.is_cancelled() {
                return Admission::Accepted(Emission::Cancelled);
            }

            let staged = staging.items.len() as u64;
            let demand = self.demand.get();
            let emission = if staged < demand {
                Emission::Delivered
            } else if self.config.has_room((staged - demand) as usize) {
                Emission::Buffered
            } else {
                return Admission::Full(item);
            };

            staging.items.push_back(item);
            emission
        };

        self.drain();
        Admission::Accepted(emission)
    }

    pub(crate) fn emit(&self, item: T) -> Result<Emission> {
        match self.admit(item) {
            Admission::Accepted(emission) => Ok(emission),
            Admission::Full(_rejected) => match (self.config.policy, self.config.capacity) {
                (OverflowPolicy::DropLatest, _) => {
                    trace!("buffer full, dropping latest item");
                    Ok(Emission::Dropped)
                }
                (_, Some(capacity)) if capacity > 0 => {
                    debug!("buffer overflow at capacity {}", capacity);
                    Err(BackflowError::buffer_overflow(capacity))
                }
                _ => {
                    warn!("item emitted without outstanding demand");
                    Err(BackflowError::NoDemand)
                }
            },
        }
    }

    pub(crate) fn listen_for_space(&self) -> EventListener {
        self.space.listen()
    }

    pub(crate) fn complete(&self) -> Result<()> {
        self.terminate(Terminal::Complete)
    }

    pub(crate) fn fail(&self, error: BackflowError) -> Result<()> {
        self.terminate(Terminal::Error(error))
    }

    /// Close a channel whose emitter went away without a terminal signal.
    ///
    /// Staged items stay deliverable; the error follows them.
    pub(crate) fn abandon(&self) {
        if self.done.load(Ordering::Acquire) {
            return;
        }

        if !self.flag.is_cancelled() {
            debug!("emitter dropped without a terminal signal");
        }
        let error = BackflowError::stream_error("emitter dropped without a terminal signal");
        if let Err(error) = self.terminate(Terminal::Error(error)) {
            trace!("abandoned channel already terminated: {}", error);
        }
    }

    fn terminate(&self, terminal: Terminal) -> Result<()> {
        if self.done.swap(true, Ordering::AcqRel) {
            return Err(BackflowError::DoubleTermination);
        }

        if self.flag.is_cancelled() {
            // Cancellation acknowledged by the producer; nothing is delivered.
            self.flag.terminate();
        } else {
            self.staging.lock().terminal = Some(terminal);
        }

        self.space.notify(usize::MAX);
        self.drain();
        Ok(())
    }

    pub(crate) fn set_on_cancel(&self, hook: CancelHook) {
        if self.flag.is_cancelled() {
            hook();
            return;
        }

        *self.on_cancel.lock() = Some(hook);

        // Cancellation may have raced the registration.
        if self.flag.is_cancelled() {
            let hook = self.on_cancel.lock().take();
            if let Some(hook) = hook {
                hook();
            }
        }
    }

    pub(crate) fn set_on_request(&self, hook: RequestHook) {
        *self.on_request.lock() = Some(hook);
    }

    /// Outstanding demand not yet consumed by staged items.
    pub(crate) fn requested(&self) -> u64 {
        let staged = self.staging.lock().items.len() as u64;
        self.demand.get().saturating_sub(staged)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    pub(crate) fn state(&self) -> FlagState {
        self.flag.state()
    }

    pub(crate) fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        // A panicking subscriber must not leave the channel owned forever.
        let unwind = WipReset(&self.wip);
        let mut missed = 1;
        loop {
            if self.flag.is_cancelled() {
                self.discard();
            } else {
                self.deliver();
            }

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
        core::mem::forget(unwind);
    }

    fn next_step(&self) -> Step<T> {
        let mut staging = self.staging.lock();
        if staging.items.is_empty() {
            return staging.terminal.take().map_or(Step::Idle, Step::Terminal);
        }
        if !self.demand.try_take_one() {
            return Step::Idle;
        }
        staging.items.pop_front().map_or(Step::Idle, Step::Item)
    }

    fn deliver(&self) {
        let mut slot = self.subscriber.lock();
        if slot.is_none() {
            return;
        }

        loop {
            if self.flag.is_cancelled() {
                return;
            }

            match self.next_step() {
                Step::Item(item) => {
                    self.space.notify(1);
                    if let Some(subscriber) = slot.as_mut() {
                        subscriber.on_next(item);
                    }
                }
                Step::Terminal(terminal) => {
                    self.flag.terminate();
                    let subscriber = slot.take();
                    drop(slot);
                    self.release_hooks();

                    if let Some(mut subscriber) = subscriber {
                        match terminal {
                            Terminal::Complete => {
                                trace!("delivering completion");
                                subscriber.on_complete();
                            }
                            Terminal::Error(error) => {
                                debug!("delivering error: {}", error);
                                subscriber.on_error(error);
                            }
                        }
                    }
                    return;
                }
                Step::Idle => return,
            }
        }
    }

    fn discard(&self) {
        {
            let mut staging = self.staging.lock();
            staging.items.clear();
            staging.terminal = None;
        }
        let subscriber = self.subscriber.lock().take();
        drop(subscriber);
        self.release_hooks();
    }

    fn release_hooks(&self) {
        let on_request = self.on_request.lock().take();
        let on_cancel = self.on_cancel.lock().take();
        drop(on_request);
        drop(on_cancel);
    }
}

impl<T: Send + 'static> ChannelCore<T> {
    pub(crate) fn subscribe(self: &Arc<Self>, mut subscriber: BoxSubscriber<T>) -> Result<Subscription> {
        if self.subscribed.swap(true, Ordering::AcqRel) {
            debug!("channel rejected a second subscriber");
            return Err(BackflowError::AlreadySubscribed);
        }

        let subscription = Subscription::new(Arc::clone(self) as Arc<dyn SubscriptionControl>);
        subscriber.on_subscribe(&subscription.downgrade());
        *self.subscriber.lock() = Some(subscriber);
        trace!("channel subscribed");

        self.drain();
        Ok(subscription)
    }
}

impl<T: Send + 'static> SubscriptionControl for ChannelCore<T> {
    fn request(&self, n: u64) -> Result<()> {
        let total = self.demand.add(n)?;
        trace!("requested {} items, outstanding {}", n, total);

        if self.flag.is_cancelled() {
            return Ok(());
        }

        self.drain();
        self.space.notify(usize::MAX);

        let hook = self.on_request.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
        Ok(())
    }

    fn cancel(&self) {
        if self.flag.request_cancel() {
            debug!("channel cancelled");
            let hook = self.on_cancel.lock().take();
            if let Some(hook) = hook {
                hook();
            }
        }

        self.space.notify(usize::MAX);
        self.drain();
    }

    fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }
}
