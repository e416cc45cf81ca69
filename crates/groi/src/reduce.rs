//! Hull peeling: the reduction half of the pipeline.
//!
//! Each step tries removing every vertex of the current hull (in ring order),
//! rebuilds the hull of the remaining locations, and commits the removal with
//! the highest resulting density `support / area`. Trials are independent.
//! The loop stops when no trial yields a positive-area hull.
//!
//! Notes
//! - Ties keep the first vertex in ring order (strict `>`), see `hull` for the
//!   ring convention.
//! - A removal is committed even when density drops compared to the previous
//!   step; selection needs the full sequence down to degeneracy.
//! - A peeled hull lies inside its parent, so its area is capped at the
//!   parent's. The estimator's rounding can otherwise rank a nearly
//!   collinear peel a few ulps above its parent.

use crate::aggregate::Locations;
use crate::area::{area, SQUARE_DEGREE_KM2};
use crate::coord::Coordinate;
use crate::hull::{convex_hull_indices, ring_contains};

/// A convex hull snapshot and the total support of the locations it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPolygon {
    /// Counter-clockwise ring, no closing vertex.
    pub ring: Vec<Coordinate>,
    pub support: u64,
    area: f64,
}

impl ConvexPolygon {
    /// Measures `ring` once; see [`crate::area::area`].
    pub fn new(ring: Vec<Coordinate>, support: u64) -> Self {
        let area = area(&ring);
        Self { ring, support, area }
    }

    /// Spherical area in square degrees.
    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    #[inline]
    pub fn area_km2(&self) -> f64 {
        self.area * SQUARE_DEGREE_KM2
    }

    /// Support per square degree; `0` for degenerate shapes.
    pub fn density(&self) -> f64 {
        if self.area > 0.0 {
            self.support as f64 / self.area
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.area <= 0.0
    }

    /// Inside-or-on-boundary test with a small absolute slack.
    #[inline]
    pub fn contains(&self, p: Coordinate) -> bool {
        ring_contains(&self.ring, p, 1e-12)
    }
}

/// Candidate polygons, index 0 = full hull, last = most peeled.
pub type CandidateSequence = Vec<ConvexPolygon>;

struct Trial {
    slot: usize,
    hull: Vec<usize>,
    area: f64,
}

/// Hull of the live slots, as slots.
fn live_hull(
    coords: &[Coordinate],
    alive: &[bool],
    live: &mut Vec<usize>,
    pts: &mut Vec<Coordinate>,
) -> Vec<usize> {
    live.clear();
    live.extend((0..coords.len()).filter(|&s| alive[s]));
    pts.clear();
    pts.extend(live.iter().map(|&s| coords[s]));
    convex_hull_indices(pts).into_iter().map(|i| live[i]).collect()
}

/// Peel hull vertices off `locations` until the remainder degenerates.
///
/// Post:
/// - `out[0]` is the hull of every location with the total support.
/// - Each later entry has positive area, support lowered by exactly the support
///   of the removed location, and nests inside its predecessor.
/// - Areas never increase along the sequence.
/// - At most `locations.len()` removals are committed.
pub fn reduce(locations: &Locations) -> CandidateSequence {
    let slots = locations.as_slice();
    let coords: Vec<Coordinate> = slots.iter().map(|w| w.coord).collect();
    let ring_of = |hull: &[usize]| -> Vec<Coordinate> { hull.iter().map(|&s| coords[s]).collect() };
    let mut alive = vec![true; coords.len()];
    let mut live: Vec<usize> = Vec::with_capacity(coords.len());
    let mut pts: Vec<Coordinate> = Vec::with_capacity(coords.len());

    let mut hull = live_hull(&coords, &alive, &mut live, &mut pts);
    let mut total = locations.total_support();
    let first = ConvexPolygon::new(ring_of(&hull), total);
    let mut current_area = first.area();
    let mut sequence = vec![first];

    for step in 1u64.. {
        let mut max_density = 0.0;
        let mut best: Option<Trial> = None;

        for &slot in &hull {
            alive[slot] = false;
            let trial = live_hull(&coords, &alive, &mut live, &mut pts);
            alive[slot] = true;
            let trial_area = area(&ring_of(&trial)).min(current_area);
            if trial_area > 0.0 {
                let density = (total - slots[slot].support) as f64 / trial_area;
                if density > max_density {
                    max_density = density;
                    best = Some(Trial {
                        slot,
                        hull: trial,
                        area: trial_area,
                    });
                }
            }
        }

        let Some(Trial { slot, hull: next, area: next_area }) = best else {
            break;
        };
        alive[slot] = false;
        total -= slots[slot].support;
        tracing::debug!(
            step,
            x = coords[slot].x,
            y = coords[slot].y,
            support = total,
            density = max_density,
            "peeled hull vertex"
        );
        sequence.push(ConvexPolygon {
            ring: ring_of(&next),
            support: total,
            area: next_area,
        });
        hull = next;
        current_area = next_area;
    }

    tracing::debug!(candidates = sequence.len(), "reduction finished");
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::WeightedLocation;

    fn locs(points: &[(f64, f64, u64)]) -> Locations {
        points
            .iter()
            .map(|&(x, y, support)| WeightedLocation {
                coord: Coordinate::new(x, y),
                support,
            })
            .collect()
    }

    #[test]
    fn under_three_points_gives_degenerate_seed_only() {
        let seq = reduce(&locs(&[(0.0, 0.0, 3), (1.0, 1.0, 2)]));
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0].support, 5);
        assert!(seq[0].is_degenerate());
    }

    #[test]
    fn empty_locations() {
        let seq = reduce(&Locations::new());
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0].support, 0);
        assert!(seq[0].ring.is_empty());
    }

    #[test]
    fn collinear_set_does_not_peel() {
        let seq = reduce(&locs(&[(0.0, 0.0, 1), (1.0, 0.0, 1), (2.0, 0.0, 1), (3.0, 0.0, 1)]));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn heavy_vertex_survives_peeling() {
        // Removing the heavy corner loses more support than any area gain buys.
        let seq = reduce(&locs(&[
            (0.0, 0.0, 50),
            (1.0, 0.0, 1),
            (1.0, 1.0, 1),
            (0.0, 1.0, 1),
            (0.5, 0.4, 1),
        ]));
        let first_removed = &seq[1];
        assert!(first_removed.ring.contains(&Coordinate::new(0.0, 0.0)));
        assert_eq!(first_removed.support, 53);
    }

    #[test]
    fn support_drops_by_removed_weight() {
        let seq = reduce(&locs(&[
            (0.0, 0.0, 2),
            (4.0, 0.0, 3),
            (4.0, 4.0, 4),
            (0.0, 4.0, 5),
            (2.0, 2.0, 6),
            (9.0, 9.0, 1),
        ]));
        assert_eq!(seq[0].support, 21);
        // The far corner carries the least support and the most area.
        assert_eq!(seq[1].support, 20);
        assert!(!seq[1].ring.contains(&Coordinate::new(9.0, 9.0)));
        for pair in seq.windows(2) {
            assert!(pair[0].support > pair[1].support);
            assert!(pair[0].area() >= pair[1].area());
        }
        assert!(seq.len() <= 6);
        assert!(seq.iter().skip(1).all(|p| !p.is_degenerate()));
    }
}
