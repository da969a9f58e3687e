//! Deterministic RNG oracle.
//!
//! Combat rolls (critical hits) go through a trait so tests can pin the
//! outcome, and so a battle is fully replayable: the same battle seed and
//! action sequence always produce the same rolls. Implementations must be
//! stateless functions of the seed they are handed.

/// RNG oracle for deterministic combat rolls.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform roll in `[0, 1)`, for chance checks against a probability.
    fn roll_unit(&self, seed: u64) -> f64 {
        f64::from(self.next_u32(seed)) / (f64::from(u32::MAX) + 1.0)
    }
}

/// PCG-XSH-RR random number generator.
///
/// Small state, fast, and statistically solid; the output is a pure
/// function of the seed, which is exactly what the replay guarantee needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// LCG step: `state' = state × multiplier + increment (mod 2^64)`.
    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation over the advanced state.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes battle-local entropy sources into a roll seed.
///
/// Use a distinct `context` for each independent roll within one action
/// (e.g. the target index of an AOE), so rolls never reuse a seed.
pub fn compute_seed(battle_seed: u64, nonce: u64, slot: u32, context: u32) -> u64 {
    let mut hash = battle_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(slot).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
