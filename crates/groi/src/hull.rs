//! Convex hull of a planar point set (lon/lat treated as plane coordinates).
//!
//! Ring conventions
//! - Counter-clockwise, starting at the lexicographically smallest `(x, y)`
//!   vertex, no repeated closing vertex.
//! - Points strictly inside an edge are dropped.
//! - Degenerate inputs (fewer than 3 distinct points, all collinear) give a
//!   ring of at most 2 vertices, which has zero area. Never an error.
//!
//! The reduction loop enumerates removal trials in this ring order, so the
//! order is part of the tie-break contract.

use nalgebra::Vector2;

use crate::coord::Coordinate;

/// Andrew's monotone chain convex hull.
pub fn convex_hull(points: &[Coordinate]) -> Vec<Coordinate> {
    convex_hull_indices(points)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Same ring as [`convex_hull`], as indices into `points`.
///
/// Of several identical points the one with the lowest index is used.
pub fn convex_hull_indices(points: &[Coordinate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[a].lex_cmp(&points[b]));
    order.dedup_by(|a, b| points[*a] == points[*b]);
    if order.len() < 3 {
        return order;
    }

    let at = |i: usize| points[i];
    let mut lower: Vec<usize> = Vec::with_capacity(order.len());
    for &i in &order {
        while lower.len() >= 2 && turn(at(lower[lower.len() - 2]), at(lower[lower.len() - 1]), at(i)) <= 0.0 {
            lower.pop();
        }
        lower.push(i);
    }
    let mut upper: Vec<usize> = Vec::with_capacity(order.len());
    for &i in order.iter().rev() {
        while upper.len() >= 2 && turn(at(upper[upper.len() - 2]), at(upper[upper.len() - 1]), at(i)) <= 0.0 {
            upper.pop();
        }
        upper.push(i);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    hull
}

/// Cross product of `b - a` and `c - a`: positive for a left turn.
#[inline]
pub(crate) fn turn(a: Coordinate, b: Coordinate, c: Coordinate) -> f64 {
    let ab: Vector2<f64> = b.to_vec2() - a.to_vec2();
    let ac: Vector2<f64> = c.to_vec2() - a.to_vec2();
    ab.x * ac.y - ab.y * ac.x
}

/// Whether `p` lies inside or on a counter-clockwise convex ring.
///
/// `eps` is an absolute slack on the turn test. Rings with fewer than 3
/// vertices contain only points on their vertices/segment.
pub fn ring_contains(ring: &[Coordinate], p: Coordinate, eps: f64) -> bool {
    match ring.len() {
        0 => false,
        1 => ring[0] == p,
        2 => {
            let (a, b) = (ring[0], ring[1]);
            if turn(a, b, p).abs() > eps {
                return false;
            }
            let (lo_x, hi_x) = (a.x.min(b.x), a.x.max(b.x));
            let (lo_y, hi_y) = (a.y.min(b.y), a.y.max(b.y));
            p.x >= lo_x - eps && p.x <= hi_x + eps && p.y >= lo_y - eps && p.y <= hi_y + eps
        }
        n => (0..n).all(|k| turn(ring[k], ring[(k + 1) % n], p) >= -eps),
    }
}
