//! Human-readable condensation of a coordinate set.

use std::fmt;

use serde::Serialize;

use crate::position::{CoordinateSet, Position3D};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Position3D,
    pub max: Position3D,
}

/// Summary of an extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    Empty,
    Single { point: Position3D },
    Many {
        count: usize,
        centroid: Position3D,
        bounds: Bounds,
    },
}

/// Summarize a coordinate set.
pub fn summarize(set: &CoordinateSet) -> Summary {
    match set.as_slice() {
        [] => Summary::Empty,
        [only] => Summary::Single { point: *only },
        [first, ..] => {
            let count = set.len();
            let n = count as f64;
            let mut sum = Position3D::new(0.0, 0.0, 0.0);
            let mut min = *first;
            let mut max = *first;

            for p in set {
                sum.x += p.x;
                sum.y += p.y;
                sum.z += p.z;
                min = Position3D::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
                max = Position3D::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
            }

            Summary::Many {
                count,
                centroid: Position3D::new(sum.x / n, sum.y / n, sum.z / n),
                bounds: Bounds { min, max },
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("No coordinates found."),
            Self::Single { point } => write!(f, "{point}"),
            Self::Many {
                count,
                centroid,
                bounds: Bounds { min, max },
            } => {
                writeln!(f, "Entities found: {count}")?;
                writeln!(f, "Centroid: {centroid}")?;
                write!(
                    f,
                    "Range: x:[{:.2},{:.2}]  y:[{:.2},{:.2}]  z:[{:.2},{:.2}]",
                    min.x, max.x, min.y, max.y, min.z, max.z
                )
            }
        }
    }
}
