//! A minimal single-threaded event loop that drives the tick hooks.
//!
//! Timers and deferred (`next_tick`) callbacks only; just enough of a host
//! to exercise the instrumentation the way a real reactor would.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::timing::{CallbackHandle, Instrumentation, TickType};

/// Work scheduled on the reactor. Gets the reactor back so it can schedule more.
pub type Callback = Box<dyn FnOnce(&mut Reactor) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct PendingTimer {
    handle: CallbackHandle,
    callback: Callback,
}

pub struct Reactor {
    instrumentation: Arc<Instrumentation>,
    /// Min-heap of (deadline, id); cancelled ids linger until popped
    deadlines: BinaryHeap<Reverse<(Instant, TimerId)>>,
    timers: HashMap<TimerId, PendingTimer>,
    deferred: VecDeque<Callback>,
    next_id: u64,
    stopping: bool,
}

impl Reactor {
    pub fn new(instrumentation: Arc<Instrumentation>) -> Self {
        Self {
            instrumentation,
            deadlines: BinaryHeap::new(),
            timers: HashMap::new(),
            deferred: VecDeque::new(),
            next_id: 1,
            stopping: false,
        }
    }

    pub fn instrumentation(&self) -> &Arc<Instrumentation> {
        &self.instrumentation
    }

    /// Fire `callback` once, `delay` from now.
    pub fn add_timer(
        &mut self,
        delay: Duration,
        label: &str,
        callback: impl FnOnce(&mut Reactor) + Send + 'static,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.deadlines.push(Reverse((Instant::now() + delay, id)));
        self.timers.insert(
            id,
            PendingTimer {
                handle: CallbackHandle::handler(id.0, label),
                callback: Box::new(callback),
            },
        );
        id
    }

    /// Returns `false` if the timer already fired or was never scheduled.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Run `callback` on the next loop pass, ahead of any timers.
    pub fn next_tick(&mut self, callback: impl FnOnce(&mut Reactor) + Send + 'static) {
        self.deferred.push_back(Box::new(callback));
    }

    /// Leave the loop after the current tick.
    pub fn stop(&mut self) {
        self.stopping = true;
    }

    /// Dispatch until stopped or there is nothing left to wait for.
    pub fn run(&mut self) {
        self.stopping = false;
        debug!("reactor loop starting");

        loop {
            if self.stopping {
                break;
            }

            if !self.deferred.is_empty() {
                self.run_deferred();
                continue;
            }

            match self.next_deadline() {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }
                    self.fire_due_timers();
                }
                None => break,
            }
        }

        debug!("reactor loop finished");
    }

    /// One tick for the whole batch queued so far; callbacks queued while
    /// it runs wait for the next pass.
    fn run_deferred(&mut self) {
        let batch: Vec<Callback> = self.deferred.drain(..).collect();
        trace!(count = batch.len(), "running deferred callbacks");

        let instr = Arc::clone(&self.instrumentation);
        let ctx = instr.tick_begin(TickType::LoopbreakSignalled, CallbackHandle::RunDeferredCallbacks);
        for cb in batch {
            cb(self);
        }
        instr.tick_end(ctx);
    }

    fn fire_due_timers(&mut self) {
        let now = Instant::now();
        let instr = Arc::clone(&self.instrumentation);

        while let Some(Reverse((deadline, id))) = self.deadlines.peek().copied() {
            if deadline > now || self.stopping {
                break;
            }
            self.deadlines.pop();

            let Some(timer) = self.timers.remove(&id) else {
                continue;
            };
            let ctx = instr.tick_begin(TickType::TimerFired, timer.handle);
            (timer.callback)(self);
            instr.tick_end(ctx);
        }
    }

    /// Earliest live deadline, dropping cancelled entries on the way.
    fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(Reverse((deadline, id))) = self.deadlines.peek().copied() {
            if self.timers.contains_key(&id) {
                return Some(deadline);
            }
            self.deadlines.pop();
        }
        None
    }
}
