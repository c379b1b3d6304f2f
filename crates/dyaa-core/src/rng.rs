//! Deterministic RNG wrapper, uniform samplers and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

use crate::errors::{ErrorInfo, GenError};

/// Source of independent uniform variates on `[0, 1)`.
pub trait RandomSampler {
    /// Returns the next variate in `[0, 1)`.
    fn next(&mut self) -> f64;

    /// Draws three consecutive variates, in call order.
    fn next_triple(&mut self) -> [f64; 3] {
        let r1 = self.next();
        let r2 = self.next();
        let r3 = self.next();
        [r1, r2, r3]
    }
}

/// Deterministic RNG handle exposed to generator consumers.
///
/// The handle is a thin wrapper around `StdRng` that documents the seeding
/// policy used throughout the project. A master `seed: u64` must be provided by
/// the caller. Worker substreams are derived by hashing `(master_seed,
/// substream_id)` with SipHash-1-3 configured with fixed zero keys, so two
/// workers never share RNG state.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the handle for substream `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }
}

impl RandomSampler for RngHandle {
    fn next(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Replays a fixed list of variates, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceSampler {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSampler {
    /// Creates a sampler over `values`; every value must lie in `[0, 1)`.
    pub fn new(values: Vec<f64>) -> Result<Self, GenError> {
        if values.is_empty() {
            return Err(GenError::Rng(ErrorInfo::new(
                "empty-sequence",
                "sequence sampler needs at least one variate",
            )));
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, value)| !(0.0..1.0).contains(*value))
        {
            return Err(GenError::Rng(
                ErrorInfo::new("variate-range", "variates must lie in [0, 1)")
                    .with_context("index", index.to_string())
                    .with_context("value", value.to_string()),
            ));
        }
        Ok(Self { values, cursor: 0 })
    }

    /// Number of variates handed out so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSampler for SequenceSampler {
    fn next(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
