//! Deterministic randomness for battle rolls.
//!
//! Every random decision (hit, variance, crit, status resist, AI coin flips)
//! goes through [`RollSource`]. Battles use [`BattleRng`], a seeded PCG
//! stream, so replaying a seed with the same commands reproduces the battle.
//! Tests script exact values with [`ScriptedRolls`].

/// Source of uniformly distributed rolls.
pub trait RollSource {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform value in `[0, 100)`, compared against percentage chances.
    fn percent(&mut self) -> f64 {
        self.unit() * 100.0
    }

    /// True with probability `chance` percent.
    fn chance(&mut self, chance: f64) -> bool {
        self.percent() < chance
    }

    /// Uniform index in `0..len`. Returns 0 for empty ranges.
    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.unit() * len as f64) as usize % len
    }
}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleRng {
    state: u64,
}

impl BattleRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self {
            state: mix_seed(seed),
        }
    }

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RollSource for BattleRng {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::step(self.state);
        Self::output(self.state)
    }
}

/// SplitMix-style avalanche so that nearby seeds give unrelated streams.
fn mix_seed(seed: u64) -> u64 {
    let mut hash = seed ^ 0x9e3779b97f4a7c15;
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^ (hash >> 33)
}

/// Replays a fixed list of unit-interval rolls, cycling when exhausted.
///
/// Values are given in `[0, 1)`; `percent()` therefore yields `value * 100`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRolls {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRolls {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Every roll returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }
}

impl RollSource for ScriptedRolls {
    fn next_u32(&mut self) -> u32 {
        (self.unit() * (u32::MAX as f64 + 1.0)) as u32
    }

    fn unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999_999)
    }
}
