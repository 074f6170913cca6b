use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use crate::error::{Result, ShuffleError};

/// Shuffle strategies a client can name in `service_type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShuffleType {
    #[default]
    Basic,
    Unique,
    Weighted,
}

impl ShuffleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShuffleType::Basic => "basic",
            ShuffleType::Unique => "unique",
            ShuffleType::Weighted => "weighted",
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, ShuffleType::Basic)
    }

    /// Run this strategy for a playlist of `n` tracks.
    pub fn shuffle<R: Rng + ?Sized>(&self, n: u64, rng: &mut R) -> Result<Vec<u64>> {
        match self {
            ShuffleType::Basic => Ok(basic_shuffle(n, rng)),
            ShuffleType::Unique | ShuffleType::Weighted => Err(ShuffleError::NotImplemented(*self)),
        }
    }
}

impl fmt::Display for ShuffleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShuffleType {
    type Err = ShuffleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(ShuffleType::Basic),
            "unique" => Ok(ShuffleType::Unique),
            "weighted" => Ok(ShuffleType::Weighted),
            _ => Err(ShuffleError::InvalidShuffleType),
        }
    }
}

/// Uniform permutation of `1..=n` (Fisher-Yates via `SliceRandom::shuffle`).
pub fn basic_shuffle<R: Rng + ?Sized>(n: u64, rng: &mut R) -> Vec<u64> {
    let mut sequence: Vec<u64> = (1..=n).collect();
    sequence.shuffle(rng);
    sequence
}

/// Process-wide random source shared by request handlers.
pub struct ShuffleGenerator {
    rng: Mutex<StdRng>,
}

impl ShuffleGenerator {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn generate(&self, shuffle_type: ShuffleType, n: u64) -> Result<Vec<u64>> {
        let mut rng = self.rng.lock().map_err(|_| ShuffleError::LockPoisoned)?;
        shuffle_type.shuffle(n, &mut *rng)
    }
}
