use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use super::clock::TickClock;
use super::gate::SamplingGate;
use super::percentiles::{summarize, TickTypeSummary};
use super::ring::SampleRing;
use super::Sample;
use crate::error::{check_probability, Result};
use crate::settings::TimingConfig;

// ─── Public types ────────────────────────────────────────────────

/// Owner of the instrumentation state: configuration, sample ring,
/// sampling gate and counters.
///
/// The reactor calls `tick_begin()` / `tick_end()`; user code calls
/// `enable()`, `disable()` and `samples()`, possibly from inside a tick.
pub struct Instrumentation {
    /// Read without locking on every tick
    pub(super) enabled: AtomicBool,
    /// `f64::to_bits` of the installed sample probability
    pub(super) probability_bits: AtomicU64,
    /// Bumped on every `enable` while `inner` is held; stale tick contexts
    /// are matched against it
    pub(super) generation: AtomicU64,
    pub(super) ticks_seen: AtomicU64,
    pub(super) ticks_sampled: AtomicU64,
    pub(super) clock: TickClock,
    pub(super) inner: Mutex<Inner>,
}

/// Running counters, reset on every `enable`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimingStats {
    /// Ticks that reached the gate while enabled
    pub ticks_seen: u64,
    /// Ticks the gate accepted
    pub ticks_sampled: u64,
    /// Samples pushed out of a full ring
    pub evicted: u64,
    /// Open ticks dropped because the ring was replaced or disabled meanwhile
    pub discarded: u64,
}

// ─── Internal state ──────────────────────────────────────────────

pub(super) struct Inner {
    pub(super) config: Option<TimingConfig>,
    pub(super) ring: SampleRing,
    pub(super) gate: SamplingGate,
    pub(super) discarded: u64,
}

impl Inner {
    fn new(gate: SamplingGate) -> Self {
        Self {
            config: None,
            ring: SampleRing::default(),
            gate,
            discarded: 0,
        }
    }
}

// ─── Instrumentation impl ────────────────────────────────────────

impl Instrumentation {
    /// Uninitialized instrumentation on the process clock.
    ///
    /// Fails with `ClockUnavailable` when there is no monotonic source.
    pub fn new() -> Result<Self> {
        Ok(Self::with_parts(TickClock::try_process()?, SamplingGate::from_entropy()))
    }

    /// Same as `new()`, but with a deterministic sampling gate.
    pub fn with_seed(seed: u64) -> Result<Self> {
        Ok(Self::with_parts(TickClock::try_process()?, SamplingGate::seeded(seed)))
    }

    pub fn with_parts(clock: TickClock, gate: SamplingGate) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            probability_bits: AtomicU64::new(0.0f64.to_bits()),
            generation: AtomicU64::new(0),
            ticks_seen: AtomicU64::new(0),
            ticks_sampled: AtomicU64::new(0),
            clock,
            inner: Mutex::new(Inner::new(gate)),
        }
    }

    /// Start recording with a fresh, empty ring of `max_samples`.
    ///
    /// Replaces any previous configuration and drops its samples. On an
    /// invalid probability nothing changes.
    pub fn enable(&self, max_samples: usize, sample_probability: f64) -> Result<()> {
        self.enable_with(&TimingConfig::new(max_samples, sample_probability))
    }

    /// `enable()` taking a full config; a `seed` there reseeds the gate.
    pub fn enable_with(&self, config: &TimingConfig) -> Result<()> {
        if let Err(e) = check_probability(config.sample_probability) {
            warn!(probability = config.sample_probability, "rejected tick timing configuration");
            return Err(e);
        }

        {
            let mut inner = self.inner.lock();
            inner.ring = SampleRing::new(config.max_samples);
            if let Some(seed) = config.seed {
                inner.gate = SamplingGate::seeded(seed);
            }
            inner.discarded = 0;
            inner.config = Some(config.clone());
            self.generation.fetch_add(1, Ordering::AcqRel);
            self.ticks_seen.store(0, Ordering::Relaxed);
            self.ticks_sampled.store(0, Ordering::Relaxed);
            self.probability_bits
                .store(config.sample_probability.to_bits(), Ordering::Release);
            self.enabled.store(true, Ordering::Release);
        }

        info!(
            max_samples = config.max_samples,
            sample_probability = config.sample_probability,
            "tick timing enabled"
        );
        Ok(())
    }

    /// Stop recording. Samples already taken stay readable.
    pub fn disable(&self) {
        let was_enabled = self.enabled.swap(false, Ordering::AcqRel);
        if was_enabled {
            info!("tick timing disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Recorded samples, oldest first. Empty if never enabled.
    pub fn samples(&self) -> Vec<Sample> {
        self.inner.lock().ring.snapshot()
    }

    /// Current tick-clock reading, in microseconds.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// The configuration installed by the last successful `enable`.
    pub fn config(&self) -> Option<TimingConfig> {
        self.inner.lock().config.clone()
    }

    pub fn stats(&self) -> TimingStats {
        let inner = self.inner.lock();
        TimingStats {
            ticks_seen: self.ticks_seen.load(Ordering::Relaxed),
            ticks_sampled: self.ticks_sampled.load(Ordering::Relaxed),
            evicted: inner.ring.evicted(),
            discarded: inner.discarded,
        }
    }

    /// Latency percentiles per tick type over the retained samples.
    pub fn summary(&self) -> Vec<TickTypeSummary> {
        summarize(&self.samples())
    }
}
