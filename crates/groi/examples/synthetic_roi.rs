//! Run the full pipeline on a synthetic point of interest and print the sequence.
//!
//! Usage:
//!   cargo run -p groi --example synthetic_roi -- [seed] [threshold]

use groi::prelude::*;

fn main() {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2016);
    let threshold: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0.27);

    let samples = draw_samples(SynthCfg::default(), seed);
    let seq = reduce_and_sequence_with(&samples, ReductionCfg::default());
    for (i, poly) in seq.iter().enumerate() {
        println!(
            "CP[{i:>3}] support={:>5} vertices={:>3} area_km2={:.6}",
            poly.support,
            poly.ring.len(),
            poly.area_km2()
        );
    }
    match groi::select_index(&seq, threshold) {
        Ok(cut) => println!("selected CP[{cut}] of {} (threshold {threshold})", seq.len()),
        Err(e) => eprintln!("selection failed: {e}"),
    }
}
