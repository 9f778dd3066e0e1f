use std::panic;
use std::sync::OnceLock;
use std::time::Instant;

use crate::error::{Result, TimingError};

/// Shared epoch for every process-wide clock handle.
static PROCESS_EPOCH: OnceLock<Instant> = OnceLock::new();

/// Monotonic microsecond counter anchored at a fixed epoch.
///
/// Backed by `Instant`, so wall-clock adjustments never move it. Cheap to
/// copy and to read; the tick recorder reads it twice per sampled tick.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    epoch: Instant,
}

impl TickClock {
    /// Clock anchored at the process epoch, probing the OS source on first use.
    ///
    /// `Instant::now` panics when the platform has no monotonic source; that
    /// panic is turned into `ClockUnavailable` so callers can fail at startup.
    pub fn try_process() -> Result<Self> {
        if let Some(epoch) = PROCESS_EPOCH.get() {
            return Ok(Self { epoch: *epoch });
        }
        let probed = panic::catch_unwind(Instant::now).map_err(|_| TimingError::ClockUnavailable)?;
        Ok(Self {
            epoch: *PROCESS_EPOCH.get_or_init(|| probed),
        })
    }

    /// Clock with its own epoch at the moment of the call.
    pub fn starting_now() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Microseconds since the epoch, saturating at `u64::MAX`.
    #[inline]
    pub fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}
