//! Sampled tick timing for single-threaded event loops.
//!
//! A host reactor brackets each unit of dispatched work with
//! [`Instrumentation::tick_begin`] / [`Instrumentation::tick_end`] (or the
//! process-wide versions in [`global`]). A configurable fraction of those
//! ticks is recorded as [`Sample`]s in a bounded ring, newest last, and read
//! back with [`Instrumentation::samples`].

pub mod error;
pub mod global;
pub mod reactor;
pub mod settings;
pub mod timing;

pub use error::{Result, TimingError};
pub use settings::TimingConfig;
pub use timing::{
    CallbackHandle, Instrumentation, PercentileSet, Sample, SampleRing, SamplingGate, TickClock,
    TickContext, TickType, TickTypeSummary, TimingStats,
};
