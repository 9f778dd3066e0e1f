use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Bernoulli trial deciding whether a tick gets recorded.
///
/// Owns its generator; a seeded gate makes the same decisions every run.
#[derive(Debug, Clone)]
pub struct SamplingGate {
    rng: StdRng,
}

impl SamplingGate {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `true` with the given probability.
    ///
    /// The extremes short-circuit without drawing: 0.0 never samples,
    /// 1.0 always does.
    #[inline]
    pub fn decide(&mut self, probability: f64) -> bool {
        if probability <= 0.0 || probability.is_nan() {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.gen::<f64>() < probability
    }
}

impl Default for SamplingGate {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_never_samples() {
        let mut gate = SamplingGate::seeded(1);
        assert!((0..100_000).all(|_| !gate.decide(0.0)));
    }

    #[test]
    fn one_always_samples() {
        let mut gate = SamplingGate::seeded(1);
        assert!((0..100_000).all(|_| gate.decide(1.0)));
    }

    #[test]
    fn interior_probability_is_roughly_honoured() {
        let mut gate = SamplingGate::seeded(42);
        let hits = (0..100_000).filter(|_| gate.decide(0.10)).count();
        // 10% of 100k, well inside six sigma
        assert!((8_500..11_500).contains(&hits), "{hits}");
    }

    #[test]
    fn same_seed_same_decisions() {
        let mut a = SamplingGate::seeded(7);
        let mut b = SamplingGate::seeded(7);
        let da: Vec<bool> = (0..256).map(|_| a.decide(0.5)).collect();
        let db: Vec<bool> = (0..256).map(|_| b.decide(0.5)).collect();
        assert_eq!(da, db);
    }

    #[test]
    fn nan_never_samples() {
        let mut gate = SamplingGate::seeded(3);
        assert!(!gate.decide(f64::NAN));
    }
}
