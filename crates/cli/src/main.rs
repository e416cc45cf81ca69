use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use groi::synth::{draw_samples, SynthCfg};
use groi::{ReductionCfg, SelectionCfg, SelectionError};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod input;
mod kml;
mod provenance;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "groi")]
#[command(about = "Region-of-interest polygons from geotagged samples")]
struct Cmd {
    /// Log verbosity: error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    action: Action,
}

/// Aggregation knobs; non-positive values disable a stage.
#[derive(Args, Clone, Copy, Debug)]
struct ReductionArgs {
    /// Max counted samples per exact coordinate (<= 0: unlimited)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    max_same_point: i64,
    /// Grid cell side in meters (<= 0: no gridding)
    #[arg(long, default_value_t = 8.0, allow_negative_numbers = true)]
    cell_width: f64,
    /// Drop grid cells below this support (<= 1: keep all)
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    min_cell_support: i64,
}

impl From<ReductionArgs> for ReductionCfg {
    fn from(a: ReductionArgs) -> Self {
        ReductionCfg {
            max_same_point: a.max_same_point,
            cell_width_m: a.cell_width,
            min_cell_support: a.min_cell_support,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Detect one RoI per CSV file and write them all into one KML document
    Run {
        /// A CSV file or a directory of CSV files (one point of interest each)
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        reduction: ReductionArgs,
        /// Knee threshold in [0, 1]; larger keeps larger polygons
        #[arg(long, default_value_t = 0.27)]
        threshold: f64,
    },
    /// Dump the whole candidate sequence of one CSV file as JSON
    Sequence {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        reduction: ReductionArgs,
        #[arg(long, default_value_t = 0.27)]
        threshold: f64,
    },
    /// Write a synthetic point-of-interest dataset as CSV
    Synth {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 2016)]
        seed: u64,
        /// Samples in the dense core
        #[arg(long)]
        core: Option<usize>,
        /// Samples scattered far from the core
        #[arg(long)]
        outliers: Option<usize>,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(cmd.log_level)
        .init();
    match cmd.action {
        Action::Run {
            input,
            out,
            reduction,
            threshold,
        } => run(&input, &out, reduction.into(), selection_cfg(threshold)?),
        Action::Sequence {
            input,
            out,
            reduction,
            threshold,
        } => sequence(&input, &out, reduction.into(), selection_cfg(threshold)?),
        Action::Synth {
            out,
            seed,
            core,
            outliers,
        } => synth(&out, seed, core, outliers),
        Action::Report => report(),
    }
}

fn selection_cfg(threshold: f64) -> Result<SelectionCfg> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(SelectionError::ThresholdOutOfRange(threshold).into());
    }
    Ok(SelectionCfg { threshold })
}

fn reduction_params(cfg: ReductionCfg, sel: SelectionCfg) -> serde_json::Value {
    json!({
        "max_same_point": cfg.max_same_point,
        "cell_width_m": cfg.cell_width_m,
        "min_cell_support": cfg.min_cell_support,
        "threshold": sel.threshold
    })
}

fn run(input: &Path, out: &Path, cfg: ReductionCfg, sel: SelectionCfg) -> Result<()> {
    let files = input::list_inputs(input)?;
    tracing::info!(input = %input.display(), files = files.len(), "run");

    let mut placemarks = Vec::with_capacity(files.len());
    let mut processed = Vec::with_capacity(files.len());
    for file in &files {
        match analyze(file, cfg, sel) {
            Ok(pm) => {
                placemarks.push(pm);
                processed.push(file.clone());
            }
            Err(e) => {
                tracing::error!(file = %file.display(), error = %format!("{e:#}"), "skipping input");
            }
        }
    }

    write_output(out, kml::document(&placemarks).as_bytes())?;
    let payload = Payload::new("run", reduction_params(cfg, sel)).with_inputs(&processed);
    write_sidecar(out, payload)?;
    tracing::info!(
        out = %out.display(),
        written = placemarks.len(),
        failed = files.len() - placemarks.len(),
        "wrote kml"
    );
    Ok(())
}

/// Load one file, run the pipeline and render the selected polygon.
fn analyze(file: &Path, cfg: ReductionCfg, sel: SelectionCfg) -> Result<String> {
    let coords = input::load_coordinates(file)?;
    let seq = groi::reduce_and_sequence_with(&coords, cfg);
    let cut = groi::select_index(&seq, sel.threshold)?;
    let roi = &seq[cut];
    tracing::info!(
        file = %file.display(),
        samples = coords.len(),
        candidates = seq.len(),
        cut,
        support = roi.support,
        "selected roi"
    );
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let metadata = vec![
        ("name".to_string(), name),
        ("support".to_string(), roi.support.to_string()),
        ("candidates".to_string(), seq.len().to_string()),
        ("cut".to_string(), cut.to_string()),
        ("area_km2".to_string(), format!("{:.6}", roi.area_km2())),
    ];
    Ok(kml::placemark(&roi.ring, &metadata))
}

#[derive(Serialize)]
struct CandidateRow {
    index: usize,
    support: u64,
    area_sq_deg: f64,
    area_km2: f64,
    ring: Vec<[f64; 2]>,
}

#[derive(Serialize)]
struct SequenceDoc {
    input: String,
    samples: usize,
    selected: usize,
    candidates: Vec<CandidateRow>,
}

fn sequence(input: &Path, out: &Path, cfg: ReductionCfg, sel: SelectionCfg) -> Result<()> {
    let coords = input::load_coordinates(input)?;
    let seq = groi::reduce_and_sequence_with(&coords, cfg);
    let selected = groi::select_index(&seq, sel.threshold)?;
    let doc = SequenceDoc {
        input: input.to_string_lossy().into_owned(),
        samples: coords.len(),
        selected,
        candidates: seq
            .iter()
            .enumerate()
            .map(|(index, poly)| CandidateRow {
                index,
                support: poly.support,
                area_sq_deg: poly.area(),
                area_km2: poly.area_km2(),
                ring: poly.ring.iter().map(|c| [c.x, c.y]).collect(),
            })
            .collect(),
    };
    write_output(out, &serde_json::to_vec_pretty(&doc)?)?;
    write_sidecar(
        out,
        Payload::new("sequence", reduction_params(cfg, sel)).with_inputs([input]),
    )?;
    tracing::info!(candidates = seq.len(), selected, out = %out.display(), "wrote sequence");
    Ok(())
}

fn synth(out: &Path, seed: u64, core: Option<usize>, outliers: Option<usize>) -> Result<()> {
    let defaults = SynthCfg::default();
    let cfg = SynthCfg {
        core: core.unwrap_or(defaults.core),
        outliers: outliers.unwrap_or(defaults.outliers),
        ..defaults
    };
    let samples = draw_samples(cfg, seed);
    ensure_parent(out)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(out)
        .with_context(|| format!("creating {}", out.display()))?;
    for c in &samples {
        writer.serialize((c.x, c.y))?;
    }
    writer.flush()?;
    write_sidecar(
        out,
        Payload::new(
            "synth",
            json!({
                "seed": seed,
                "core": cfg.core,
                "outliers": cfg.outliers,
                "center": [cfg.center.x, cfg.center.y]
            }),
        ),
    )?;
    tracing::info!(samples = samples.len(), out = %out.display(), "wrote synthetic samples");
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::code_rev(),
        "groi_version": groi::VERSION,
        "defaults": reduction_params(ReductionCfg::default(), SelectionCfg::default())
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn square_csv(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(
            &path,
            "0,0\n10,0\n10,10\n0,10\n5,5,2\n100,100\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn run_writes_kml_and_sidecar() {
        let dir = tempdir().unwrap();
        let inputs = dir.path().join("in");
        fs::create_dir(&inputs).unwrap();
        square_csv(&inputs, "a.csv");
        fs::write(inputs.join("broken.csv"), "1,x\n").unwrap();
        fs::write(inputs.join("huge.csv"), "1,2,18446744073709551615\n").unwrap();
        let out = dir.path().join("out/roi.kml");

        run(&inputs, &out, ReductionCfg::raw(), SelectionCfg::default()).unwrap();

        let kml = fs::read_to_string(&out).unwrap();
        assert_eq!(kml.matches("<Placemark>").count(), 1);
        assert!(kml.contains("<name>a.csv</name>"));
        let prov = dir.path().join("out/roi.provenance.json");
        let parsed: serde_json::Value = serde_json::from_slice(&fs::read(prov).unwrap()).unwrap();
        assert_eq!(parsed["params"]["cell_width_m"], -1.0);
        assert_eq!(parsed["inputs"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn sequence_dump_lists_every_candidate() {
        let dir = tempdir().unwrap();
        let input = square_csv(dir.path(), "poi.csv");
        let out = dir.path().join("seq.json");
        sequence(&input, &out, ReductionCfg::raw(), SelectionCfg::default()).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        let candidates = doc["candidates"].as_array().unwrap();
        assert!(candidates.len() >= 2);
        assert_eq!(doc["samples"], 7);
        assert_eq!(candidates[0]["support"], 7);
        assert_eq!(candidates[1]["support"], 6);
    }

    #[test]
    fn synth_round_trips_through_loader() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("synth.csv");
        synth(&out, 3, Some(50), Some(5)).unwrap();
        let pts = input::load_coordinates(&out).unwrap();
        assert_eq!(pts.len(), 55);
    }

    #[test]
    fn threshold_is_checked_up_front() {
        assert!(selection_cfg(0.5).is_ok());
        let err = selection_cfg(2.0).unwrap_err();
        assert!(err.to_string().contains("[0, 1]"));
    }
}
