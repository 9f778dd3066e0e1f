use std::sync::atomic::Ordering;

use tracing::debug;

use super::controller::Instrumentation;
use super::{CallbackHandle, Sample, TickType};

/// What `tick_begin` hands back to the reactor for the matching `tick_end`.
///
/// The sampling decision is baked in here: a no-op context stays a no-op,
/// so the gate is never consulted twice for one bracket.
#[derive(Debug)]
#[must_use = "pass the context to tick_end to record the tick"]
pub struct TickContext {
    pending: Option<PendingTick>,
}

#[derive(Debug)]
struct PendingTick {
    tick_type: TickType,
    callback: CallbackHandle,
    start_time: u64,
    generation: u64,
}

impl TickContext {
    pub const fn noop() -> Self {
        Self { pending: None }
    }

    /// `true` when this tick was selected by the gate.
    pub fn is_sampling(&self) -> bool {
        self.pending.is_some()
    }
}

// ─── Hot path ────────────────────────────────────────────────────

impl Instrumentation {
    /// Open a tick bracket. Called right before the reactor runs a unit of work.
    #[inline]
    pub fn tick_begin(&self, tick_type: TickType, callback: CallbackHandle) -> TickContext {
        if !self.enabled.load(Ordering::Acquire) {
            return TickContext::noop();
        }

        self.ticks_seen.fetch_add(1, Ordering::Relaxed);
        let generation = self.generation.load(Ordering::Acquire);
        let probability = f64::from_bits(self.probability_bits.load(Ordering::Acquire));

        // Only an interior probability needs the gate's generator
        let sampled = if probability <= 0.0 {
            false
        } else if probability >= 1.0 {
            true
        } else {
            self.inner.lock().gate.decide(probability)
        };
        if !sampled {
            return TickContext::noop();
        }
        self.ticks_sampled.fetch_add(1, Ordering::Relaxed);

        // Clock read stays outside the lock
        let start_time = self.clock.now();

        TickContext {
            pending: Some(PendingTick {
                tick_type,
                callback,
                start_time,
                generation,
            }),
        }
    }

    /// Close a tick bracket and store the sample if the tick was selected.
    #[inline]
    pub fn tick_end(&self, ctx: TickContext) {
        let Some(pending) = ctx.pending else {
            return;
        };

        let end_time = self.clock.now();

        let mut inner = self.inner.lock();
        if self.generation.load(Ordering::Acquire) != pending.generation
            || !self.enabled.load(Ordering::Acquire)
        {
            inner.discarded += 1;
            debug!(
                tick_type = %pending.tick_type,
                "discarding tick opened before the sample buffer changed"
            );
            return;
        }
        inner.ring.push(Sample::new(
            pending.tick_type,
            pending.callback,
            pending.start_time,
            end_time,
        ));
    }

    /// Run `f` inside a tick bracket and return its result.
    pub fn time<T>(&self, tick_type: TickType, callback: CallbackHandle, f: impl FnOnce() -> T) -> T {
        let ctx = self.tick_begin(tick_type, callback);
        let out = f();
        self.tick_end(ctx);
        out
    }
}
