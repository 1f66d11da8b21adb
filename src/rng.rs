//! Deterministic per-unit RNG sub-stream derivation.
//!
//! A single master seed must expand into one independent stream per
//! stochastic unit without a prior pass to assign sequential sub-seeds, so
//! unit ids can be mixed directly. This is a generalization of the
//! single fixed per-feature seed offset pattern into a real `(seed, unit_id)`
//! mixing function.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Splitmix64 finalizer, used here as an avalanche mix over `(seed, unit_id)`.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derives an independent 64-bit seed for `unit_id` from `master_seed`.
///
/// Distinct unit ids under the same master seed produce uncorrelated
/// streams; the same `(master_seed, unit_id)` pair always reproduces the
/// same seed.
pub fn derive_seed(master_seed: u64, unit_id: u64) -> u64 {
    let mixed = master_seed ^ splitmix64(unit_id);
    splitmix64(mixed)
}

/// Builds a seeded RNG for `unit_id` under `master_seed`.
pub fn unit_rng(master_seed: u64, unit_id: u64) -> StdRng {
    StdRng::seed_from_u64(derive_seed(master_seed, unit_id))
}
