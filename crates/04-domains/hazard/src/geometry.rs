//! Positions, distances and radial falloff.

use domain_core::{HashState, StateHasher};
use fixed_point::{Q16, Q48};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: Q16,
    pub y: Q16,
    pub z: Q16,
}

impl Point {
    pub const ORIGIN: Point = Point {
        x: Q16::ZERO,
        y: Q16::ZERO,
        z: Q16::ZERO,
    };

    pub fn new(x: Q16, y: Q16, z: Q16) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance, computed on wide values and rounded down.
    pub fn distance(&self, other: &Point) -> Q48 {
        let axis = |a: Q16, b: Q16| {
            let d = a.widen().saturating_sub(b.widen());
            d.saturating_mul(d)
        };
        axis(self.x, other.x)
            .saturating_add(axis(self.y, other.y))
            .saturating_add(axis(self.z, other.z))
            .sqrt()
    }
}

impl HashState for Point {
    fn hash_state(&self, h: &mut StateHasher) {
        h.write_q16(self.x);
        h.write_q16(self.y);
        h.write_q16(self.z);
    }
}

/// Linear falloff `1 - dist / radius`, zero at and beyond the radius.
///
/// A zero radius is a point source: it reaches only distance zero, at full
/// strength.
pub fn falloff(dist: Q48, radius: Q16) -> Q16 {
    let radius = radius.widen();
    if radius <= Q48::ZERO {
        return if dist.is_zero() { Q16::ONE } else { Q16::ZERO };
    }
    if dist >= radius {
        return Q16::ZERO;
    }
    let covered = dist.saturating_div(radius).narrow();
    Q16::ONE.saturating_sub(covered).clamp01()
}
