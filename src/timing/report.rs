use std::fmt::Write as _;

use chrono::{DateTime, Duration, Local};

use super::Sample;

/// Microseconds per second, for converting tick-clock deltas
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Place a sample's start on the wall clock.
///
/// `now_us` and `wall_now` must be captured together; the sample is
/// assumed to lie `now_us - start_time` microseconds in the past.
pub fn wall_time(sample: &Sample, now_us: u64, wall_now: DateTime<Local>) -> DateTime<Local> {
    let ago = now_us.saturating_sub(sample.start_time());
    let ago = i64::try_from(ago).unwrap_or(i64::MAX);
    wall_now - Duration::microseconds(ago)
}

/// One sample's row, without a trailing newline.
///
/// Labels are escaped by `CallbackHandle`'s `Display`, so a row never spans
/// more than one line.
pub fn format_row(sample: &Sample, now_us: u64) -> String {
    let latency = sample.duration_us() as f64 / MICROS_PER_SECOND;
    let ago = now_us.saturating_sub(sample.start_time()) as f64 / MICROS_PER_SECOND;
    format!(
        "{:<20}  {:0.5}  {:0.5}  {}",
        sample.tick_type(),
        -ago,
        latency,
        sample.callback()
    )
}

/// One line per sample:
/// `<tick type>  <-seconds ago>  <latency seconds>  <callback>`.
pub fn render(samples: &[Sample], now_us: u64) -> String {
    let mut out = String::new();
    for s in samples {
        let _ = writeln!(out, "{}", format_row(s, now_us));
    }
    out
}

/// `render()` with each row prefixed by the sample's wall-clock start.
pub fn render_with_wall_time(samples: &[Sample], now_us: u64, wall_now: DateTime<Local>) -> String {
    let mut out = String::new();
    for s in samples {
        let at = wall_time(s, now_us, wall_now).format("%H:%M:%S%.6f");
        let _ = writeln!(out, "{at}  {}", format_row(s, now_us));
    }
    out
}
