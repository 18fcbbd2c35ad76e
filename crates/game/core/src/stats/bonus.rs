//! Bonus accumulation for derived stats.
//!
//! Each stat collects bonuses from four additive layers (attributes,
//! equipment, passives, buffs). Buff multipliers apply afterwards:
//!
//! ```text
//! final = (base + sum(flat)) * product(scale)
//! ```

use strum::EnumCount;

use super::attributes::StatKind;

/// A single bonus contributed to one stat.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    /// Additive contribution.
    Flat(f64),
    /// Multiplier applied after all flat bonuses (1.2 = +20%).
    Scale(f64),
}

/// Bonuses collected for one stat.
#[derive(Clone, Debug, PartialEq)]
pub struct BonusStack {
    flat: f64,
    scale: f64,
    count: usize,
}

impl BonusStack {
    pub fn new() -> Self {
        Self {
            flat: 0.0,
            scale: 1.0,
            count: 0,
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        match bonus {
            Bonus::Flat(value) => self.flat += value,
            Bonus::Scale(factor) => self.scale *= factor,
        }
        self.count += 1;
    }

    pub fn flat(mut self, value: f64) -> Self {
        self.add(Bonus::Flat(value));
        self
    }

    pub fn scale(mut self, factor: f64) -> Self {
        self.add(Bonus::Scale(factor));
        self
    }

    pub fn apply(&self, base: f64) -> f64 {
        (base + self.flat) * self.scale
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }
}

impl Default for BonusStack {
    fn default() -> Self {
        Self::new()
    }
}

/// One [`BonusStack`] per derived stat.
#[derive(Clone, Debug, PartialEq)]
pub struct BonusSet {
    stacks: [BonusStack; StatKind::COUNT],
}

impl BonusSet {
    pub fn new() -> Self {
        Self {
            stacks: core::array::from_fn(|_| BonusStack::new()),
        }
    }

    pub fn add(&mut self, stat: StatKind, bonus: Bonus) {
        self.stacks[stat.index()].add(bonus);
    }

    pub fn stack(&self, stat: StatKind) -> &BonusStack {
        &self.stacks[stat.index()]
    }
}

impl Default for BonusSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flats_sum_before_scales_multiply() {
        let stack = BonusStack::new().flat(5.0).scale(1.5).flat(5.0).scale(0.8);
        assert!((stack.apply(10.0) - 24.0).abs() < 1e-9);
        assert_eq!(stack.len(), 4);
    }

    #[test]
    fn empty_stack_is_identity() {
        let stack = BonusStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.apply(42.0), 42.0);
    }
}
