//! Process-wide instrumentation.
//!
//! The reactor hooks here are free functions so the host loop does not need
//! to thread an `Instrumentation` through its dispatch code. Until the first
//! successful `enable`, nothing is allocated and the hooks do nothing.

use std::sync::OnceLock;

use crate::error::Result;
use crate::settings::TimingConfig;
use crate::timing::{
    CallbackHandle, Instrumentation, Sample, TickClock, TickContext, TickType, TickTypeSummary,
    TimingStats,
};

/// Global instrumentation handle
static INSTRUMENTATION: OnceLock<Instrumentation> = OnceLock::new();

fn instance() -> Result<&'static Instrumentation> {
    if let Some(i) = INSTRUMENTATION.get() {
        return Ok(i);
    }
    let fresh = Instrumentation::new()?;
    Ok(INSTRUMENTATION.get_or_init(|| fresh))
}

/// The process-wide instance, if `enable` has ever succeeded.
pub fn instrumentation() -> Option<&'static Instrumentation> {
    INSTRUMENTATION.get()
}

pub fn enable(max_samples: usize, sample_probability: f64) -> Result<()> {
    enable_with(&TimingConfig::new(max_samples, sample_probability))
}

pub fn enable_with(config: &TimingConfig) -> Result<()> {
    config.validate()?;
    instance()?.enable_with(config)
}

pub fn disable() {
    if let Some(i) = INSTRUMENTATION.get() {
        i.disable();
    }
}

pub fn is_enabled() -> bool {
    INSTRUMENTATION.get().is_some_and(Instrumentation::is_enabled)
}

#[inline]
pub fn tick_begin(tick_type: TickType, callback: CallbackHandle) -> TickContext {
    match INSTRUMENTATION.get() {
        Some(i) => i.tick_begin(tick_type, callback),
        None => TickContext::noop(),
    }
}

#[inline]
pub fn tick_end(ctx: TickContext) {
    if let Some(i) = INSTRUMENTATION.get() {
        i.tick_end(ctx);
    }
}

pub fn samples() -> Vec<Sample> {
    INSTRUMENTATION.get().map(Instrumentation::samples).unwrap_or_default()
}

pub fn stats() -> TimingStats {
    INSTRUMENTATION.get().map(Instrumentation::stats).unwrap_or_default()
}

pub fn summary() -> Vec<TickTypeSummary> {
    INSTRUMENTATION.get().map(Instrumentation::summary).unwrap_or_default()
}

/// Tick-clock microseconds; valid whether or not timing was ever enabled.
pub fn now() -> u64 {
    match INSTRUMENTATION.get() {
        Some(i) => i.now(),
        None => TickClock::try_process().map(|c| c.now()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimingError;
    use serial_test::serial;

    fn tick(ty: TickType) {
        let ctx = tick_begin(ty, CallbackHandle::RunDeferredCallbacks);
        tick_end(ctx);
    }

    #[test]
    #[serial]
    fn test_enable_record_read() {
        enable(3, 1.0).unwrap();
        assert!(is_enabled());
        tick(TickType::TimerFired);
        tick(TickType::LoopbreakSignalled);

        let types: Vec<TickType> = samples().iter().map(Sample::tick_type).collect();
        assert_eq!(types, vec![TickType::TimerFired, TickType::LoopbreakSignalled]);
        assert_eq!(stats().ticks_sampled, 2);
        assert_eq!(summary().len(), 2);
    }

    #[test]
    #[serial]
    fn test_disable_turns_hooks_off() {
        enable(3, 1.0).unwrap();
        tick(TickType::TimerFired);
        disable();
        assert!(!is_enabled());

        let ctx = tick_begin(TickType::TimerFired, CallbackHandle::RunDeferredCallbacks);
        assert!(!ctx.is_sampling());
        tick_end(ctx);
        assert_eq!(samples().len(), 1);
    }

    #[test]
    #[serial]
    fn test_invalid_enable_keeps_previous_samples() {
        enable(3, 1.0).unwrap();
        tick(TickType::TimerFired);

        let err = enable(3, f64::NAN).unwrap_err();
        assert!(matches!(err, TimingError::InvalidConfiguration { .. }));
        assert_eq!(samples().len(), 1);
    }

    #[test]
    #[serial]
    fn test_now_is_monotonic() {
        let a = now();
        let b = now();
        assert!(b >= a);
    }
}
