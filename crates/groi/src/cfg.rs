//! Pipeline parameters with the reference defaults.

/// Aggregation parameters for `reduce_and_sequence_with`.
///
/// Non-positive values switch the corresponding stage off (see `aggregate`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReductionCfg {
    /// Cap on counted samples sharing one exact coordinate; `<= 0` is unlimited.
    pub max_same_point: i64,
    /// Grid cell side in meters; `<= 0` keeps raw coordinates.
    pub cell_width_m: f64,
    /// Cells below this support are dropped (only when gridding); `<= 1` keeps all.
    pub min_cell_support: i64,
}

impl Default for ReductionCfg {
    fn default() -> Self {
        Self {
            max_same_point: 0,
            cell_width_m: 8.0,
            min_cell_support: 2,
        }
    }
}

impl ReductionCfg {
    /// No capping, no gridding, no filtering: every distinct raw coordinate is a location.
    pub fn raw() -> Self {
        Self {
            max_same_point: -1,
            cell_width_m: -1.0,
            min_cell_support: -1,
        }
    }
}

/// Knee-selection parameters for `select_roi_with`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionCfg {
    /// Must lie in `[0, 1]`; larger values keep larger polygons.
    pub threshold: f64,
}

impl Default for SelectionCfg {
    fn default() -> Self {
        Self { threshold: 0.27 }
    }
}
