use lane_defence_core::ChanceSource;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reproducible chance source backed by a seeded ChaCha stream.
#[derive(Clone, Debug)]
pub struct SeededChance {
    rng: ChaCha8Rng,
}

impl SeededChance {
    /// Creates a source whose rolls are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ChanceSource for SeededChance {
    fn succeeds(&mut self, probability: f32) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.gen_bool(f64::from(probability))
    }
}
