//! RNG oracle for deterministic random number generation.
//!
//! Wander targets, cover and grenade rolls, stay durations and attack-order
//! overflow all draw from here. Every roll is a pure function of a seed, so a
//! simulation replays identically from the same inputs.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Returns true with `percent` probability (0 never, 100 always).
    fn chance(&self, seed: u64, percent: u32) -> bool {
        percent > 0 && self.roll_d100(seed) <= percent
    }

    /// Uniform float in `[0, 1)`.
    fn unit_f32(&self, seed: u64) -> f32 {
        // Top 24 bits fit an f32 mantissa exactly.
        (self.next_u32(seed) >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform float in `[min, max)`; returns `min` for empty ranges.
    fn range_f32(&self, seed: u64, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.unit_f32(seed)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output from 64-bit state, a single multiply plus
/// xorshift and rotate. Same seed always produces the same output.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Compute a deterministic seed from simulation components.
///
/// * `sim_seed` - Base seed from [`crate::SimConfig`]
/// * `frame` - Tick counter
/// * `subject` - Agent id, or `u32::MAX` for simulation-level rolls
/// * `context` - Distinguishes multiple rolls by the same subject in one tick
pub fn compute_seed(sim_seed: u64, frame: u64, subject: u32, context: u32) -> u64 {
    let mut hash = sim_seed;

    hash ^= frame.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (subject as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
