//! Action-gauge turn scheduling.
//!
//! Every living unit fills its gauge at its speed. A unit whose gauge has
//! reached the threshold may act; when several are ready the highest gauge
//! goes first and ties fall back to roster order. When nobody is ready the
//! scheduler fast-forwards exactly far enough for the next unit to become
//! ready and hands control back to the caller.

use crate::config::BattleConfig;
use crate::state::{Unit, UnitId};
use crate::status::BuffKind;

/// Result of one scheduling pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SchedulerStep {
    /// This unit acts now.
    Ready(UnitId),
    /// Gauges advanced by `ticks`; call again to pick the actor.
    Advanced { ticks: f64 },
    /// Every living unit's gauge is frozen.
    Stalled,
}

/// Gauge debited when a turn ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GaugeCost {
    /// Cost recorded by the committed skill.
    Action(f64),
    MoveOnly,
    Idle,
}

impl GaugeCost {
    pub fn amount(self, config: &BattleConfig) -> f64 {
        match self {
            GaugeCost::Action(cost) => cost,
            GaugeCost::MoveOnly => config.move_only_cost,
            GaugeCost::Idle => config.idle_cost,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnScheduler {
    threshold: f64,
}

impl TurnScheduler {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &BattleConfig) -> Self {
        Self::new(config.gauge_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn participates(unit: &Unit) -> bool {
        unit.is_alive() && !unit.has(BuffKind::Stop)
    }

    /// Ready unit with the highest gauge, if any.
    pub fn ready(&self, units: &[Unit]) -> Option<UnitId> {
        let mut best: Option<&Unit> = None;
        for unit in units.iter().filter(|u| Self::participates(u)) {
            if unit.gauge < self.threshold {
                continue;
            }
            if best.is_none_or(|b| unit.gauge > b.gauge) {
                best = Some(unit);
            }
        }
        best.map(|u| u.id)
    }

    pub fn next(&self, units: &mut [Unit]) -> SchedulerStep {
        if let Some(id) = self.ready(units) {
            return SchedulerStep::Ready(id);
        }

        let mut soonest: Option<(usize, f64)> = None;
        for (index, unit) in units.iter().enumerate() {
            if !Self::participates(unit) {
                continue;
            }
            let speed = unit.stats().spd.max(1) as f64;
            let ticks = (self.threshold - unit.gauge) / speed;
            if soonest.is_none_or(|(_, best)| ticks < best) {
                soonest = Some((index, ticks));
            }
        }
        let Some((leader, ticks)) = soonest else {
            return SchedulerStep::Stalled;
        };

        for unit in units.iter_mut().filter(|u| Self::participates(u)) {
            let speed = unit.stats().spd.max(1) as f64;
            unit.gauge += speed * ticks;
        }
        // Guard against float shortfall on the unit that defined the step.
        if units[leader].gauge < self.threshold {
            units[leader].gauge = self.threshold;
        }
        SchedulerStep::Advanced { ticks }
    }
}

/// Debits `cost` from `unit`'s gauge and returns the amount debited.
pub fn debit(unit: &mut Unit, cost: GaugeCost, config: &BattleConfig) -> f64 {
    let amount = cost.amount(config);
    unit.gauge -= amount;
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Team;
    use crate::stats::Attributes;
    use crate::status::Buff;

    fn runner(id: u32, spd: i32) -> Unit {
        let attrs = Attributes {
            agi: spd - 70,
            ..Attributes::uniform(0)
        };
        Unit::new(UnitId(id), format!("r{id}"), Team::Player, attrs)
    }

    #[test]
    fn faster_unit_catches_up_first() {
        let scheduler = TurnScheduler::new(100.0);
        let mut units = vec![runner(0, 5), runner(1, 10)];
        assert_eq!(units[1].stats().spd, 10);

        let step = scheduler.next(&mut units);
        assert!(matches!(step, SchedulerStep::Advanced { ticks } if (ticks - 10.0).abs() < 1e-9));
        assert_eq!(units[1].gauge, 100.0);
        assert!((units[0].gauge - 50.0).abs() < 1e-9);
        assert_eq!(scheduler.next(&mut units), SchedulerStep::Ready(UnitId(1)));

        debit(&mut units[1], GaugeCost::Action(100.0), &BattleConfig::default());
        assert!(matches!(scheduler.next(&mut units), SchedulerStep::Advanced { .. }));
        // Both reach the threshold together; roster order breaks the tie.
        assert_eq!(scheduler.next(&mut units), SchedulerStep::Ready(UnitId(0)));
    }

    #[test]
    fn highest_gauge_wins() {
        let scheduler = TurnScheduler::new(100.0);
        let mut units = vec![runner(0, 10), runner(1, 10)];
        units[0].gauge = 120.0;
        units[1].gauge = 150.0;
        assert_eq!(scheduler.next(&mut units), SchedulerStep::Ready(UnitId(1)));
    }

    #[test]
    fn frozen_and_dead_units_are_skipped() {
        let scheduler = TurnScheduler::new(100.0);
        let mut units = vec![runner(0, 10), runner(1, 10)];
        units[0].gauge = 200.0;
        units[0].buffs.apply(Buff::new(BuffKind::Stop, 2, 0.0));
        units[1].hp = 0;
        assert_eq!(scheduler.next(&mut units), SchedulerStep::Stalled);
        assert_eq!(units[0].gauge, 200.0);
    }

    #[test]
    fn debit_costs() {
        let config = BattleConfig::default();
        let mut unit = runner(0, 10);
        unit.gauge = 130.0;
        assert_eq!(debit(&mut unit, GaugeCost::Idle, &config), 75.0);
        assert_eq!(debit(&mut unit, GaugeCost::MoveOnly, &config), 50.0);
        assert!((unit.gauge - 5.0).abs() < 1e-9);
    }
}
