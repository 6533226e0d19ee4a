//! Random source behind the interval fuzz.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Uniform random samples in `[0, 1)`
pub trait Jitter: Send {
    /// Draw the next sample
    fn sample(&mut self) -> f64;
}

/// Jitter drawn from a real random generator
#[derive(Debug, Clone)]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    /// Seed from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Jitter for RandomJitter {
    fn sample(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Constant sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f64);

impl FixedJitter {
    /// The midpoint sample, which leaves intervals unperturbed
    pub const NONE: Self = Self(0.5);
    /// Largest downward perturbation (-5%)
    pub const LOW: Self = Self(0.0);
}

impl Jitter for FixedJitter {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

impl<J: Jitter + ?Sized> Jitter for Box<J> {
    fn sample(&mut self) -> f64 {
        (**self).sample()
    }
}
