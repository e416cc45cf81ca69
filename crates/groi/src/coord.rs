//! Coordinate and weighted-location value types.
//!
//! - `Coordinate`: `(x = longitude, y = latitude)` in degrees. Equality and
//!   hashing are exact on both fields; it is used as an aggregation key.
//! - `WeightedLocation`: a coordinate plus the number of raw samples it stands for.

use std::hash::{Hash, Hasher};

use nalgebra::Vector2;

/// Longitude/latitude pair in degrees.
///
/// Invariants:
/// - Fields are expected to be finite; the aggregation boundary drops anything else.
/// - `0.0` and `-0.0` compare equal and hash identically (grid snapping can
///   produce either for the cell touching the origin).
#[derive(Clone, Copy, Debug, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn to_vec2(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Lexicographic `(x, y)` order; used for the hull's canonical start vertex.
    #[inline]
    pub fn lex_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl PartialEq for Coordinate {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Adding +0.0 folds -0.0 onto +0.0 so Hash agrees with PartialEq.
        (self.x + 0.0).to_bits().hash(state);
        (self.y + 0.0).to_bits().hash(state);
    }
}

impl From<(f64, f64)> for Coordinate {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Vector2<f64>> for Coordinate {
    #[inline]
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// A coordinate together with the number of raw samples collapsed into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WeightedLocation {
    pub coord: Coordinate,
    /// Always `>= 1` for locations produced by the aggregator.
    pub support: u64,
}
