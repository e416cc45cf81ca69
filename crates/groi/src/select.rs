//! Knee selection over the reduction sequence.
//!
//! Axes: `x[i] = i`, `y[i] = area(seq[i])` in km². Starting from `cut = 0`,
//! both axes are normalized over `[cut, last]` and the interior point farthest
//! below the chord (and below the threshold line `y = 1 - t - x`) becomes the
//! new cut. Repeats until no interior point qualifies.

use std::fmt;

use crate::area::SQUARE_DEGREE_KM2;
use crate::reduce::ConvexPolygon;

/// Usage errors of the selection step.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionError {
    /// Threshold outside `[0, 1]` (or NaN).
    ThresholdOutOfRange(f64),
    /// Nothing to select from.
    EmptySequence,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::ThresholdOutOfRange(t) => {
                write!(f, "threshold must lie in [0, 1], got {t}")
            }
            SelectionError::EmptySequence => write!(f, "candidate sequence is empty"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Index of the selected polygon in `sequence`.
pub fn select_index(sequence: &[ConvexPolygon], threshold: f64) -> Result<usize, SelectionError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(SelectionError::ThresholdOutOfRange(threshold));
    }
    if sequence.is_empty() {
        return Err(SelectionError::EmptySequence);
    }
    let dim = sequence.len();
    let y: Vec<f64> = sequence.iter().map(|p| p.area() * SQUARE_DEGREE_KM2).collect();
    let last = dim - 1;
    let x_last = last as f64;

    let mut cut = 0usize;
    loop {
        let mut dist_max = 0.0;
        let mut i_max = cut;
        let x_cut = cut as f64;
        for i in (cut + 1)..last {
            let x_norm = (i as f64 - x_cut) / (x_last - x_cut);
            let y_norm = (y[i] - y[last]) / (y[cut] - y[last]);
            if y_norm < 1.0 - threshold - x_norm {
                let dist = ((1.0 - y_norm) - x_norm) * std::f64::consts::FRAC_1_SQRT_2;
                if dist > dist_max {
                    dist_max = dist;
                    i_max = i;
                }
            }
        }
        if dist_max > 0.0 {
            cut = i_max;
        } else {
            break;
        }
    }
    tracing::debug!(cut, candidates = dim, threshold, "selected knee");
    Ok(cut)
}

/// The region of interest picked from `sequence`.
pub fn select_roi(sequence: &[ConvexPolygon], threshold: f64) -> Result<&ConvexPolygon, SelectionError> {
    let cut = select_index(sequence, threshold)?;
    Ok(&sequence[cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    /// Nested squares of the given half-widths around (0, 0).
    fn nested(half_widths: &[f64]) -> Vec<ConvexPolygon> {
        half_widths
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                ConvexPolygon::new(
                    vec![
                        Coordinate::new(-h, -h),
                        Coordinate::new(h, -h),
                        Coordinate::new(h, h),
                        Coordinate::new(-h, h),
                    ],
                    (half_widths.len() - i) as u64,
                )
            })
            .collect()
    }

    #[test]
    fn threshold_is_validated() {
        let seq = nested(&[2.0, 1.0]);
        assert_eq!(
            select_index(&seq, 1.5),
            Err(SelectionError::ThresholdOutOfRange(1.5))
        );
        assert!(select_index(&seq, -0.01).is_err());
        assert!(select_index(&seq, f64::NAN).is_err());
        assert_eq!(select_index(&[], 0.2), Err(SelectionError::EmptySequence));
    }

    #[test]
    fn single_and_pair_return_first() {
        assert_eq!(select_index(&nested(&[1.0]), 0.27), Ok(0));
        assert_eq!(select_index(&nested(&[2.0, 1.0]), 0.0), Ok(0));
    }

    #[test]
    fn finds_the_elbow() {
        // Area (≈ 4h² sq. degrees) collapses over two steps, then falls linearly.
        let areas = [400.0, 100.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0];
        let half_widths: Vec<f64> = areas.iter().map(|a: &f64| a.sqrt() / 2.0).collect();
        let seq = nested(&half_widths);
        let cut = select_index(&seq, 0.27).unwrap();
        assert_eq!(cut, 2);
    }

    #[test]
    fn larger_threshold_keeps_larger_polygon() {
        let seq = nested(&[10.0, 8.0, 4.0, 2.0, 1.5, 1.2, 1.0, 0.9]);
        let loose = select_index(&seq, 0.0).unwrap();
        let strict = select_index(&seq, 1.0).unwrap();
        assert_eq!(strict, 0);
        assert!(loose >= strict);
        let roi = select_roi(&seq, 0.0).unwrap();
        assert_eq!(roi, &seq[loose]);
    }

    #[test]
    fn linear_curve_has_no_knee() {
        // Equal area decrements: every interior point sits on the chord.
        let seq: Vec<ConvexPolygon> = (0..6)
            .map(|i| {
                let w = 6.0 - i as f64;
                ConvexPolygon::new(
                    vec![
                        Coordinate::new(0.0, 0.0),
                        Coordinate::new(w, 0.0),
                        Coordinate::new(w, 1e-3),
                        Coordinate::new(0.0, 1e-3),
                    ],
                    1,
                )
            })
            .collect();
        assert_eq!(select_index(&seq, 0.1), Ok(0));
    }
}
