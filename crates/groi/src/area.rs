//! Area of lon/lat rings on the sphere, in square degrees.
//!
//! Model
//! - `geo`'s Chamberlain–Duquette estimator (spherical, equatorial radius)
//!   gives m²; dividing by the area of one degree × one degree at the
//!   equator, `(R · π/180)²`, gives square degrees.
//! - The estimator is invariant under longitude shifts, so rings are moved to
//!   a local origin (first vertex at `λ = 0`) before measuring. City-scale
//!   rings near `λ ≈ 12°` otherwise lose most of their precision in the
//!   `Δλ` terms.
//! - Rings with zero planar area measure `0`.

use geo::orient::Direction;
use geo::{ChamberlainDuquetteArea, Coord, LineString, Orient, Polygon};

use crate::coord::Coordinate;

/// Surface area of one square degree at the equator, in km².
pub const SQUARE_DEGREE_KM2: f64 = 12365.1613;

/// Equatorial radius the Chamberlain–Duquette estimator works with, in m.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// m² per square degree on the estimator's sphere.
#[inline]
fn square_degree_m2() -> f64 {
    let side = EARTH_RADIUS_M * 1f64.to_radians();
    side * side
}

/// Planar shoelace area in raw coordinate units (unsigned).
pub fn planar_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    let origin = ring[0];
    let twice: f64 = (1..n - 1)
        .map(|k| {
            let (ax, ay) = (ring[k].x - origin.x, ring[k].y - origin.y);
            let (bx, by) = (ring[k + 1].x - origin.x, ring[k + 1].y - origin.y);
            ax * by - bx * ay
        })
        .sum();
    (twice * 0.5).abs()
}

/// Spherical area of a ring, in square degrees. Degenerate rings give `0`.
pub fn area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 || planar_area(ring) <= 0.0 {
        return 0.0;
    }
    let lon0 = ring[0].x;
    let exterior: LineString<f64> = ring
        .iter()
        .map(|c| Coord {
            x: c.x - lon0,
            y: c.y,
        })
        .collect();
    let polygon = Polygon::new(exterior, vec![]).orient(Direction::Default);
    let out = polygon.chamberlain_duquette_unsigned_area() / square_degree_m2();
    if out.is_finite() && out > 0.0 {
        out
    } else {
        0.0
    }
}

/// Area in km², using the equatorial square-degree constant.
#[inline]
pub fn area_km2(ring: &[Coordinate]) -> f64 {
    area(ring) * SQUARE_DEGREE_KM2
}
