//! Positions and the deduplicated set of them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal places kept in the deduplication key.
pub const DEDUP_DECIMALS: usize = 6;

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coordinates rounded to [`DEDUP_DECIMALS`] places, as decimal text.
    ///
    /// Rounding is done on the exact binary value, so `3.5e-6` rounds down
    /// to `0.000003`. Two positions with equal keys are the same entity.
    pub fn dedup_key(&self) -> (String, String, String) {
        (rounded(self.x), rounded(self.y), rounded(self.z))
    }
}

fn rounded(v: f64) -> String {
    let text = format!("{:.*}", DEDUP_DECIMALS, v);
    // Negative values that round to zero are zero.
    match text.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => text,
    }
}

impl fmt::Display for Position3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={:.4}, y={:.4}, z={:.4}", self.x, self.y, self.z)
    }
}

/// Deduplicated positions in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CoordinateSet {
    points: Vec<Position3D>,
}

impl CoordinateSet {
    /// Build a set, keeping the first position for each dedup key.
    ///
    /// Returns the set and the number of positions discarded.
    pub fn dedup(positions: impl IntoIterator<Item = Position3D>) -> (Self, usize) {
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        let mut discarded = 0;

        for p in positions {
            if seen.insert(p.dedup_key()) {
                points.push(p);
            } else {
                discarded += 1;
            }
        }

        (Self { points }, discarded)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position3D> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Position3D] {
        &self.points
    }
}

impl<'a> IntoIterator for &'a CoordinateSet {
    type Item = &'a Position3D;
    type IntoIter = std::slice::Iter<'a, Position3D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
