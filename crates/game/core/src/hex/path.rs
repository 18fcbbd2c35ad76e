//! Terrain-weighted reachability and point-to-point pathing.
//!
//! Both queries run the same uniform-cost search, so every hex reported as
//! reachable has a path whose cumulative cost stays within the budget.
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use super::Hex;

/// Result of a bounded uniform-cost search from one origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reachable {
    origin: Hex,
    costs: BTreeMap<Hex, u32>,
    parents: BTreeMap<Hex, Hex>,
}

impl Reachable {
    pub fn origin(&self) -> Hex {
        self.origin
    }

    /// True for hexes that can be entered within budget. The origin is not
    /// part of the set.
    pub fn contains(&self, hex: Hex) -> bool {
        self.costs.contains_key(&hex)
    }

    pub fn cost(&self, hex: Hex) -> Option<u32> {
        self.costs.get(&hex).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Reachable hexes with their cumulative cost, in `(q, r)` order.
    pub fn iter(&self) -> impl Iterator<Item = (Hex, u32)> + '_ {
        self.costs.iter().map(|(hex, cost)| (*hex, *cost))
    }

    /// Cheapest path to `dest`, excluding the origin and including `dest`.
    pub fn path_to(&self, dest: Hex) -> Option<Vec<Hex>> {
        if !self.contains(dest) {
            return None;
        }
        let mut path = vec![dest];
        let mut cursor = dest;
        while let Some(&parent) = self.parents.get(&cursor) {
            if parent == self.origin {
                break;
            }
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        Some(path)
    }
}

fn search(
    origin: Hex,
    budget: Option<u32>,
    goal: Option<Hex>,
    step_cost: impl Fn(Hex) -> Option<u32>,
) -> Reachable {
    let mut result = Reachable {
        origin,
        ..Reachable::default()
    };
    let mut best: BTreeMap<Hex, u32> = BTreeMap::new();
    let mut frontier = BinaryHeap::new();
    best.insert(origin, 0);
    frontier.push(Reverse((0u32, origin)));

    while let Some(Reverse((cost, hex))) = frontier.pop() {
        if best.get(&hex).is_some_and(|&known| known < cost) {
            continue;
        }
        if hex != origin {
            result.costs.insert(hex, cost);
        }
        if goal == Some(hex) {
            break;
        }
        for next in hex.neighbors() {
            if next == origin {
                continue;
            }
            let Some(step) = step_cost(next) else {
                continue;
            };
            let total = cost.saturating_add(step);
            if budget.is_some_and(|limit| total > limit) {
                continue;
            }
            if best.get(&next).is_none_or(|&known| total < known) {
                best.insert(next, total);
                result.parents.insert(next, hex);
                frontier.push(Reverse((total, next)));
            }
        }
    }
    result
}

/// Every hex enterable from `origin` with cumulative cost `<= budget`.
///
/// `step_cost` returns the cost of entering a hex, or `None` when it cannot
/// be entered at all (out of bounds, impassable terrain, occupied).
pub fn reachable(origin: Hex, budget: u32, step_cost: impl Fn(Hex) -> Option<u32>) -> Reachable {
    search(origin, Some(budget), None, step_cost)
}

/// Cheapest path from `origin` to `dest`, excluding the origin.
///
/// Returns `Some(vec![])` when `origin == dest` and `None` when `dest` cannot
/// be reached.
pub fn find_path(
    origin: Hex,
    dest: Hex,
    step_cost: impl Fn(Hex) -> Option<u32>,
) -> Option<Vec<Hex>> {
    if origin == dest {
        return Some(Vec::new());
    }
    search(origin, None, Some(dest), step_cost).path_to(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_field(radius: u32) -> impl Fn(Hex) -> Option<u32> {
        move |hex: Hex| (hex.distance(Hex::ORIGIN) <= radius).then_some(1)
    }

    #[test]
    fn flat_budget_matches_distance() {
        let set = reachable(Hex::ORIGIN, 2, open_field(5));
        assert_eq!(set.len(), 18);
        assert!(!set.contains(Hex::ORIGIN));
        assert!(set.iter().all(|(hex, cost)| cost == hex.distance(Hex::ORIGIN)));
    }

    #[test]
    fn heavy_terrain_shrinks_reach() {
        let forest = Hex::new(1, 0);
        let cost = |hex: Hex| {
            if hex.distance(Hex::ORIGIN) > 4 {
                None
            } else if hex == forest {
                Some(3)
            } else {
                Some(1)
            }
        };
        let set = reachable(Hex::ORIGIN, 2, cost);
        assert!(!set.contains(forest));
        // Still reachable around the forest.
        assert_eq!(set.cost(Hex::new(2, -1)), Some(2));
    }

    #[test]
    fn occupied_hexes_are_excluded_and_routed_around() {
        let blocker = Hex::new(1, 0);
        let cost = |hex: Hex| (hex != blocker && hex.distance(Hex::ORIGIN) <= 4).then_some(1);
        let set = reachable(Hex::ORIGIN, 3, cost);
        assert!(!set.contains(blocker));
        assert_eq!(set.cost(Hex::new(2, 0)), Some(3));
        let path = set.path_to(Hex::new(2, 0)).expect("path exists");
        assert_eq!(path.len(), 3);
        assert!(!path.contains(&blocker));
    }

    #[test]
    fn find_path_excludes_origin_and_ends_at_destination() {
        let path = find_path(Hex::ORIGIN, Hex::new(3, 0), open_field(5)).expect("path");
        assert_eq!(path, vec![Hex::new(1, 0), Hex::new(2, 0), Hex::new(3, 0)]);
        assert_eq!(find_path(Hex::ORIGIN, Hex::ORIGIN, open_field(5)), Some(vec![]));
    }

    #[test]
    fn unreachable_destination_has_no_path() {
        let walled = |hex: Hex| (hex.distance(Hex::ORIGIN) <= 1).then_some(1);
        assert_eq!(find_path(Hex::ORIGIN, Hex::new(3, 0), walled), None);
    }

    proptest! {
        #[test]
        fn every_reachable_path_fits_the_budget(
            budget in 0u32..5,
            walls in proptest::collection::btree_set((-3i32..=3, -3i32..=3), 0..10),
        ) {
            let walls: Vec<Hex> = walls.into_iter().map(|(q, r)| Hex::new(q, r)).collect();
            let cost = |hex: Hex| {
                if hex.distance(Hex::ORIGIN) > 4 || walls.contains(&hex) {
                    None
                } else {
                    Some(1 + (hex.q.rem_euclid(2)) as u32)
                }
            };
            let set = reachable(Hex::ORIGIN, budget, &cost);
            for (hex, total) in set.iter() {
                prop_assert!(total <= budget);
                let path = set.path_to(hex).expect("reachable hex has a path");
                let walked: u32 = path.iter().map(|h| cost(*h).unwrap_or(u32::MAX)).sum();
                prop_assert_eq!(walked, total);
            }
        }
    }
}
