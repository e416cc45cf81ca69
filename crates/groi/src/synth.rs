//! Synthetic geotagged samples around a point of interest.
//!
//! Model
//! - `core` samples uniform in a square of half-side `core_radius_m` around `center`.
//! - `outliers` samples uniform in a square of half-side `outlier_radius_m`.
//! - With probability `duplicate_rate` a sample repeats the previous one exactly
//!   (a user posting several items from the same spot).
//! - Meters are converted with the same equatorial steps the aggregator uses.
//!
//! Determinism: a fixed `(cfg, seed)` always yields the same samples in the same order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aggregate::{STEP_1M_X, STEP_1M_Y};
use crate::coord::Coordinate;

/// Sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct SynthCfg {
    pub center: Coordinate,
    pub core: usize,
    pub core_radius_m: f64,
    pub outliers: usize,
    pub outlier_radius_m: f64,
    /// Clamped to `[0, 1)`.
    pub duplicate_rate: f64,
}

impl Default for SynthCfg {
    fn default() -> Self {
        Self {
            // Colosseum, Rome.
            center: Coordinate::new(12.4922, 41.8902),
            core: 1500,
            core_radius_m: 60.0,
            outliers: 40,
            outlier_radius_m: 1500.0,
            duplicate_rate: 0.05,
        }
    }
}

/// Draw raw samples; core samples first, then outliers.
pub fn draw_samples(cfg: SynthCfg, seed: u64) -> Vec<Coordinate> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dup = cfg.duplicate_rate.clamp(0.0, 0.999);
    let mut out: Vec<Coordinate> = Vec::with_capacity(cfg.core + cfg.outliers);
    let groups = [
        (cfg.core, cfg.core_radius_m.max(0.0)),
        (cfg.outliers, cfg.outlier_radius_m.max(0.0)),
    ];
    for (count, radius_m) in groups {
        for _ in 0..count {
            if let Some(&prev) = out.last() {
                if rng.gen::<f64>() < dup {
                    out.push(prev);
                    continue;
                }
            }
            let dx = (rng.gen::<f64>() * 2.0 - 1.0) * radius_m;
            let dy = (rng.gen::<f64>() * 2.0 - 1.0) * radius_m;
            out.push(Coordinate::new(
                cfg.center.x + dx * STEP_1M_X,
                cfg.center.y + dy * STEP_1M_Y,
            ));
        }
    }
    out
}
