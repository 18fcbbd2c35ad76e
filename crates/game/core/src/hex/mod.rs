//! Axial hex coordinates and geometry.
//!
//! Hexes use the axial `(q, r)` system with an implicit third cube coordinate
//! `s = -q - r`. Pixel conversions assume a pointy-top layout where `y` grows
//! downward, which is what facing and direction matching are defined against.
mod path;

pub use path::{Reachable, find_path, reachable};

use core::fmt;
use core::ops::{Add, Sub};

/// Axial hex coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate.
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance: `(|dq| + |dq + dr| + |dr|) / 2`.
    pub const fn distance(self, other: Hex) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.unsigned_abs() + (dq + dr).unsigned_abs() + dr.unsigned_abs()) / 2
    }

    pub fn neighbor(self, direction: Direction) -> Hex {
        let (dq, dr) = direction.offset();
        Hex::new(self.q + dq, self.r + dr)
    }

    /// The six neighbors in [`Direction::ALL`] order.
    pub fn neighbors(self) -> [Hex; 6] {
        Direction::ALL.map(|direction| self.neighbor(direction))
    }

    /// Center of this hex in a pointy-top pixel layout with unit size.
    pub fn to_pixel(self) -> (f64, f64) {
        let q = self.q as f64;
        let r = self.r as f64;
        (3f64.sqrt() * (q + r / 2.0), 1.5 * r)
    }

    /// Direction a unit standing here would face when looking at `other`.
    ///
    /// Exact neighbor offsets match directly; anything else falls back to the
    /// pixel-space angle rounded to the nearest 60 degrees. Returns `None`
    /// when both hexes are equal.
    pub fn direction_to(self, other: Hex) -> Option<Direction> {
        if self == other {
            return None;
        }
        let delta = (other.q - self.q, other.r - self.r);
        if let Some(direction) = Direction::ALL
            .into_iter()
            .find(|direction| direction.offset() == delta)
        {
            return Some(direction);
        }
        let (x0, y0) = self.to_pixel();
        let (x1, y1) = other.to_pixel();
        Some(Direction::from_angle((y1 - y0).atan2(x1 - x0)))
    }

    /// All hexes within `radius` of `self`, in ascending `(q, r)` order.
    pub fn within(self, radius: u32) -> impl Iterator<Item = Hex> {
        let n = radius as i32;
        (-n..=n).flat_map(move |dq| {
            let lo = (-n).max(-dq - n);
            let hi = n.min(-dq + n);
            (lo..=hi).map(move |dr| Hex::new(self.q + dq, self.r + dr))
        })
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, rhs: Hex) -> Hex {
        Hex::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for Hex {
    type Output = Hex;

    fn sub(self, rhs: Hex) -> Hex {
        Hex::new(self.q - rhs.q, self.r - rhs.r)
    }
}

/// The six hex directions, in neighbor order.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumCount,
    strum::AsRefStr,
    strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Axial offset of the neighbor in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (0, -1),
            Direction::West => (-1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (0, 1),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Number of 60 degree steps between two directions (0..=3).
    pub const fn rotational_distance(self, other: Direction) -> u8 {
        let diff = self.index().abs_diff(other.index());
        (if diff > 3 { 6 - diff } else { diff }) as u8
    }

    /// Nearest direction to a pixel-space angle in radians (y down).
    ///
    /// Directions are spaced counter-clockwise on screen, which is clockwise
    /// in y-down radians, hence the negation.
    pub fn from_angle(radians: f64) -> Self {
        let sector = (-radians.to_degrees() / 60.0).round() as i64;
        Self::from_index(sector.rem_euclid(6) as usize)
    }
}

/// Fractional cube coordinate used for interpolation and rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeCoord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CubeCoord {
    // Nudge applied to interpolated points so exact ties round consistently.
    const EPSILON: (f64, f64, f64) = (1e-6, 2e-6, -3e-6);

    pub fn from_hex(hex: Hex) -> Self {
        Self {
            x: hex.q as f64,
            y: hex.s() as f64,
            z: hex.r as f64,
        }
    }

    pub fn lerp(a: CubeCoord, b: CubeCoord, t: f64) -> Self {
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            z: a.z + (b.z - a.z) * t,
        }
    }

    fn nudged(self) -> Self {
        Self {
            x: self.x + Self::EPSILON.0,
            y: self.y + Self::EPSILON.1,
            z: self.z + Self::EPSILON.2,
        }
    }

    /// Rounds to the nearest hex, fixing the component with the largest
    /// rounding error so that `x + y + z == 0` holds.
    pub fn round(self) -> Hex {
        let mut rx = self.x.round();
        let ry = self.y.round();
        let mut rz = self.z.round();

        let dx = (rx - self.x).abs();
        let dy = (ry - self.y).abs();
        let dz = (rz - self.z).abs();

        if dx > dy && dx > dz {
            rx = -ry - rz;
        } else if dy <= dz {
            rz = -rx - ry;
        }
        Hex::new(rx as i32, rz as i32)
    }
}

/// Point at parameter `t` along the segment `from -> to` (t may exceed 1).
fn point_along(from: Hex, to: Hex, t: f64) -> Hex {
    CubeCoord::lerp(CubeCoord::from_hex(from), CubeCoord::from_hex(to), t)
        .nudged()
        .round()
}

/// Traces the line `from -> to` sampled at `range + 1` evenly spaced steps.
///
/// The first sample is `from` and the last is `to`; consecutive samples may
/// repeat when `range` exceeds the hex distance.
pub fn line(from: Hex, to: Hex, range: u32) -> Vec<Hex> {
    if range == 0 {
        return vec![from];
    }
    let steps = range as f64;
    (0..=range)
        .map(|i| {
            if i == 0 {
                from
            } else if i == range {
                to
            } else {
                point_along(from, to, i as f64 / steps)
            }
        })
        .collect()
}

/// Distinct hexes on the line `from -> to`, excluding `from`.
pub fn line_cells(from: Hex, to: Hex) -> Vec<Hex> {
    let mut cells: Vec<Hex> = Vec::new();
    for hex in line(from, to, from.distance(to)).into_iter().skip(1) {
        if cells.last() != Some(&hex) {
            cells.push(hex);
        }
    }
    cells
}

/// Extends the ray `origin -> target` by `extra` hexes (negative values walk
/// back toward the origin), one hex at a time, and returns the last hex for
/// which `passable` held.
///
/// The walk stops at the first blocked hex, so obstacles clip the result.
/// Returns `target` when nothing could be traversed.
pub fn hex_in_direction(
    origin: Hex,
    target: Hex,
    extra: i32,
    passable: impl Fn(Hex) -> bool,
) -> Hex {
    let base = origin.distance(target);
    if base == 0 || extra == 0 {
        return target;
    }
    let sign = extra.signum();
    let mut current = target;
    for step in 1..=extra.unsigned_abs() {
        let length = base as i64 + sign as i64 * step as i64;
        if length <= 0 {
            break;
        }
        let candidate = point_along(origin, target, length as f64 / base as f64);
        if candidate == current {
            continue;
        }
        if !passable(candidate) {
            break;
        }
        current = candidate;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hex() -> impl Strategy<Value = Hex> {
        (-12i32..=12, -12i32..=12).prop_map(|(q, r)| Hex::new(q, r))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in hex(), b in hex()) {
            prop_assert_eq!(a.distance(b), b.distance(a));
        }

        #[test]
        fn distance_to_self_is_zero(a in hex()) {
            prop_assert_eq!(a.distance(a), 0);
        }

        #[test]
        fn line_starts_and_ends_on_endpoints(a in hex(), b in hex()) {
            let cells = line(a, b, a.distance(b));
            prop_assert_eq!(cells.first().copied(), Some(a));
            prop_assert_eq!(cells.last().copied(), Some(b));
            prop_assert_eq!(cells.len() as u32, a.distance(b) + 1);
        }

        #[test]
        fn line_steps_are_adjacent(a in hex(), b in hex()) {
            let cells = line(a, b, a.distance(b));
            for pair in cells.windows(2) {
                prop_assert_eq!(pair[0].distance(pair[1]), 1);
            }
        }
    }

    #[test]
    fn neighbors_are_at_distance_one_in_fixed_order() {
        let center = Hex::new(2, -1);
        let neighbors = center.neighbors();
        assert_eq!(neighbors[0], Hex::new(3, -1));
        assert_eq!(neighbors[5], Hex::new(2, 0));
        assert!(neighbors.iter().all(|n| n.distance(center) == 1));
    }

    #[test]
    fn direction_matches_offsets_then_angles() {
        let origin = Hex::ORIGIN;
        for direction in Direction::ALL {
            assert_eq!(origin.direction_to(origin.neighbor(direction)), Some(direction));
        }
        assert_eq!(origin.direction_to(Hex::new(4, 0)), Some(Direction::East));
        assert_eq!(origin.direction_to(Hex::new(-3, 0)), Some(Direction::West));
        assert_eq!(origin.direction_to(Hex::new(0, 3)), Some(Direction::SouthEast));
        assert_eq!(origin.direction_to(origin), None);
    }

    #[test]
    fn opposite_and_rotation() {
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!(Direction::SouthEast.opposite(), Direction::NorthWest);
        assert_eq!(Direction::East.rotational_distance(Direction::SouthEast), 1);
        assert_eq!(Direction::NorthEast.rotational_distance(Direction::SouthWest), 3);
    }

    #[test]
    fn within_counts_hexagon_cells() {
        assert_eq!(Hex::ORIGIN.within(0).count(), 1);
        assert_eq!(Hex::ORIGIN.within(2).count(), 19);
        assert!(Hex::new(3, 3).within(2).all(|h| h.distance(Hex::new(3, 3)) <= 2));
    }

    #[test]
    fn knockback_extends_to_requested_distance() {
        let origin = Hex::ORIGIN;
        let target = Hex::new(2, 0);
        let landing = hex_in_direction(origin, target, 2, |_| true);
        assert_eq!(landing, Hex::new(4, 0));
        assert_eq!(origin.distance(landing), 4);
    }

    #[test]
    fn knockback_is_clipped_by_obstacles() {
        let origin = Hex::ORIGIN;
        let target = Hex::new(2, 0);
        let landing = hex_in_direction(origin, target, 2, |h| h != Hex::new(4, 0));
        assert_eq!(landing, Hex::new(3, 0));

        let blocked = hex_in_direction(origin, target, 2, |h| h != Hex::new(3, 0));
        assert_eq!(blocked, target);
    }

    #[test]
    fn negative_extension_walks_toward_origin() {
        let landing = hex_in_direction(Hex::ORIGIN, Hex::new(3, 0), -2, |_| true);
        assert_eq!(landing, Hex::new(1, 0));
        let stop = hex_in_direction(Hex::ORIGIN, Hex::new(1, 0), -3, |_| true);
        assert_eq!(stop, Hex::new(1, 0));
    }

    #[test]
    fn line_cells_skip_origin() {
        let cells = line_cells(Hex::ORIGIN, Hex::new(3, 0));
        assert_eq!(cells, vec![Hex::new(1, 0), Hex::new(2, 0), Hex::new(3, 0)]);
    }
}
