use std::collections::BTreeMap;

use hdrhistogram::Histogram;
use serde::Serialize;

use super::{Sample, TickType};

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

/// Percentile breakdown of tick durations (μs); all zero when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileSet {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub p999: u64,
    pub count: u64,
}

/// Latency breakdown for one kind of tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickTypeSummary {
    pub tick_type: TickType,
    /// Unclamped sum of the retained durations for this type
    pub total_us: u64,
    /// Share of the retained busy time spent in this type, 0.0–1.0
    pub share: f64,
    pub latency_us: PercentileSet,
}

impl PercentileSet {
    fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::default();
        }
        Self {
            min: hist.min(),
            max: hist.max(),
            mean: hist.mean(),
            p50: hist.value_at_quantile(0.50),
            p95: hist.value_at_quantile(0.95),
            p99: hist.value_at_quantile(0.99),
            p999: hist.value_at_quantile(0.999),
            count: hist.len(),
        }
    }
}

fn new_histogram() -> Histogram<u64> {
    Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG).expect("histogram creation")
}

/// Group samples by tick type, ordered by raw code, one histogram each.
///
/// Durations are clamped into the histogram range, so a zero-length tick
/// counts as 1 μs in the percentiles; `total_us` and `share` use the raw
/// durations.
pub fn summarize(samples: &[Sample]) -> Vec<TickTypeSummary> {
    let mut by_type: BTreeMap<u32, (TickType, u64, Histogram<u64>)> = BTreeMap::new();
    let mut busy_us: u64 = 0;

    for s in samples {
        let dur = s.duration_us();
        busy_us = busy_us.saturating_add(dur);

        let (_, total, hist) = by_type
            .entry(s.tick_type().raw())
            .or_insert_with(|| (s.tick_type(), 0, new_histogram()));
        *total = total.saturating_add(dur);
        let _ = hist.record(dur.clamp(HIST_LOW, HIST_HIGH));
    }

    by_type
        .into_values()
        .map(|(tick_type, total_us, hist)| TickTypeSummary {
            tick_type,
            total_us,
            share: if busy_us > 0 {
                total_us as f64 / busy_us as f64
            } else {
                0.0
            },
            latency_us: PercentileSet::from_histogram(&hist),
        })
        .collect()
}
