//! Region-of-interest detection from geotagged samples.
//!
//! Pipeline
//! - `aggregate`: cap exact duplicates, snap to a metric grid, drop sparse cells.
//! - `reduce`: peel convex-hull vertices, one per step, keeping the densest
//!   remainder; yields a nested sequence of candidate polygons.
//! - `select`: pick the knee of the normalized area curve over that sequence.
//!
//! Geometry lives in `hull` (monotone chain) and `area` (spherical area in
//! square degrees). Everything is single-threaded and pure; run independent
//! datasets in parallel at the caller if needed.

pub mod aggregate;
pub mod area;
pub mod cfg;
pub mod coord;
pub mod hull;
pub mod reduce;
pub mod select;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use aggregate::{aggregate, Locations};
pub use area::{area, SQUARE_DEGREE_KM2};
pub use cfg::{ReductionCfg, SelectionCfg};
pub use coord::{Coordinate, WeightedLocation};
pub use hull::convex_hull;
pub use reduce::{reduce, CandidateSequence, ConvexPolygon};
pub use select::{select_index, select_roi, SelectionError};

/// Common exports for callers.
pub mod prelude {
    pub use crate::synth::{draw_samples, SynthCfg};
    pub use crate::{
        reduce_and_sequence, reduce_and_sequence_with, select_roi, select_roi_with,
        CandidateSequence, ConvexPolygon, Coordinate, ReductionCfg, SelectionCfg, SelectionError,
    };
}

/// Aggregate raw samples and run the reduction.
///
/// Reference parameters: `(0, 8.0, 2)`; see `ReductionCfg::default`.
pub fn reduce_and_sequence(
    coordinates: &[Coordinate],
    max_same_point: i64,
    cell_width_m: f64,
    min_cell_support: i64,
) -> CandidateSequence {
    let locations = aggregate(coordinates, max_same_point, cell_width_m, min_cell_support);
    reduce(&locations)
}

#[inline]
pub fn reduce_and_sequence_with(coordinates: &[Coordinate], cfg: ReductionCfg) -> CandidateSequence {
    reduce_and_sequence(
        coordinates,
        cfg.max_same_point,
        cfg.cell_width_m,
        cfg.min_cell_support,
    )
}

#[inline]
pub fn select_roi_with(
    sequence: &[ConvexPolygon],
    cfg: SelectionCfg,
) -> Result<&ConvexPolygon, SelectionError> {
    select_roi(sequence, cfg.threshold)
}
