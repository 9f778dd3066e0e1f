use thiserror::Error;

// ─── Unified error type ──────────────────────────────────────────

/// Everything that can go wrong outside the tick hot path.
///
/// `tick_begin` / `tick_end` / `samples` / `now` never return these.
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("sample_probability must be within [0.0, 1.0], got {probability}")]
    InvalidConfiguration { probability: f64 },

    #[error("monotonic clock is unavailable on this platform")]
    ClockUnavailable,

    #[error("failed to load tick timing settings: {0}")]
    Settings(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, TimingError>;

/// Reject NaN and anything outside the closed unit interval.
pub(crate) fn check_probability(probability: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(TimingError::InvalidConfiguration { probability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_unit_interval_bounds() {
        assert_eq!(check_probability(0.0).unwrap(), 0.0);
        assert_eq!(check_probability(1.0).unwrap(), 1.0);
        assert_eq!(check_probability(0.25).unwrap(), 0.25);
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        for p in [-0.01, 1.0001, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                matches!(check_probability(p), Err(TimingError::InvalidConfiguration { .. })),
                "{p} should be rejected"
            );
        }
    }
}
