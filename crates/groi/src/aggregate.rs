//! Aggregation of raw samples into weighted locations.
//!
//! Two explicit passes over the input:
//! 1. count: cap exact duplicates, snap to the grid, accumulate per key;
//! 2. filter: drop grid cells whose support is below the threshold.
//!
//! `Locations` keeps the keys in first-seen order (arena `Vec` plus a
//! coordinate → slot index), so results are reproducible for a fixed input order.

use std::collections::HashMap;

use crate::coord::{Coordinate, WeightedLocation};

/// Degrees of longitude spanned by one meter at the equator.
pub const STEP_1M_X: f64 = 1.2080663828690774e-5;
/// Degrees of latitude spanned by one meter at the equator.
pub const STEP_1M_Y: f64 = 8.992909382672273e-6;

/// Distinct coordinates with their accumulated support, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Locations {
    items: Vec<WeightedLocation>,
    index: HashMap<Coordinate, usize>,
}

impl Locations {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `support` samples at `coord`, creating the entry on first sight.
    pub fn add(&mut self, coord: Coordinate, support: u64) {
        match self.index.get(&coord) {
            Some(&slot) => self.items[slot].support += support,
            None => {
                self.index.insert(coord, self.items.len());
                self.items.push(WeightedLocation { coord, support });
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, WeightedLocation> {
        self.items.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[WeightedLocation] {
        &self.items
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.items.iter().map(|w| w.coord)
    }

    /// Slot of `coord` in `as_slice()`.
    #[inline]
    pub fn index_of(&self, coord: &Coordinate) -> Option<usize> {
        self.index.get(coord).copied()
    }

    #[inline]
    pub fn support(&self, coord: &Coordinate) -> Option<u64> {
        self.index_of(coord).map(|slot| self.items[slot].support)
    }

    pub fn total_support(&self) -> u64 {
        self.items.iter().map(|w| w.support).sum()
    }

    /// Keep entries matching `keep`, preserving order; the index is rebuilt.
    pub fn retain<F: FnMut(&WeightedLocation) -> bool>(&mut self, mut keep: F) {
        self.items.retain(|w| keep(w));
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(slot, w)| (w.coord, slot))
            .collect();
    }
}

impl FromIterator<WeightedLocation> for Locations {
    fn from_iter<I: IntoIterator<Item = WeightedLocation>>(iter: I) -> Self {
        let mut out = Locations::new();
        for w in iter {
            out.add(w.coord, w.support);
        }
        out
    }
}

impl<'a> IntoIterator for &'a Locations {
    type Item = &'a WeightedLocation;
    type IntoIter = std::slice::Iter<'a, WeightedLocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Lower-left corner of the grid cell holding `c` (truncation toward zero,
/// so for negative coordinates the corner nearest the origin).
#[inline]
pub fn snap_to_cell(c: Coordinate, cell_width_m: f64) -> Coordinate {
    let step_x = STEP_1M_X * cell_width_m;
    let step_y = STEP_1M_Y * cell_width_m;
    Coordinate::new(
        (c.x / step_x).trunc() * step_x,
        (c.y / step_y).trunc() * step_y,
    )
}

/// Filter and aggregate raw coordinates.
///
/// - `max_same_point > 0`: only the first `max_same_point` samples at an exactly
///   identical raw coordinate are counted.
/// - `cell_width_m > 0`: samples are snapped to square cells of that side.
/// - `min_cell_support > 1` (and gridding on): cells below it are dropped.
///
/// Non-finite samples are skipped and reported once.
pub fn aggregate(
    coordinates: &[Coordinate],
    max_same_point: i64,
    cell_width_m: f64,
    min_cell_support: i64,
) -> Locations {
    let mut locations = Locations::new();
    let mut seen: HashMap<Coordinate, i64> = HashMap::new();
    let mut non_finite = 0usize;
    let mut capped = 0usize;

    for &raw in coordinates {
        if !raw.is_finite() {
            non_finite += 1;
            continue;
        }
        if max_same_point > 0 {
            let count = seen.entry(raw).or_insert(0);
            if *count >= max_same_point {
                capped += 1;
                continue;
            }
            *count += 1;
        }
        let key = if cell_width_m > 0.0 {
            snap_to_cell(raw, cell_width_m)
        } else {
            raw
        };
        locations.add(key, 1);
    }

    if non_finite > 0 {
        tracing::warn!(non_finite, "skipped non-finite coordinates");
    }

    let before = locations.len();
    if cell_width_m > 0.0 && min_cell_support > 1 {
        let min = min_cell_support as u64;
        locations.retain(|w| w.support >= min);
    }
    tracing::debug!(
        samples = coordinates.len(),
        capped,
        cells = before,
        kept = locations.len(),
        "aggregated"
    );
    locations
}
