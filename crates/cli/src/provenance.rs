use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Effective parameters and inputs of one command, recorded next to its output.
#[derive(Debug)]
pub struct Payload {
    pub command: &'static str,
    pub params: Value,
    pub inputs: Vec<String>,
}

impl Payload {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self {
            command,
            params,
            inputs: Vec::new(),
        }
    }

    pub fn with_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.inputs = inputs
            .into_iter()
            .map(|p| p.as_ref().to_string_lossy().into_owned())
            .collect();
        self
    }
}

/// Write `<artifact>.provenance.json` with code revision, library version, params, inputs and output.
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }
    let doc = json!({
        "code_rev": code_rev(),
        "groi_version": groi::VERSION,
        "command": payload.command,
        "params": payload.params,
        "inputs": payload.inputs,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    tracing::debug!(path = %provenance_path.display(), "wrote provenance");
    Ok(provenance_path)
}

/// `roi.kml` -> `roi.provenance.json`, next to the artifact.
fn provenance_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// `GROI_CODE_REV` when set (release builds, CI), else `git describe` of the cwd.
pub fn code_rev() -> String {
    std::env::var("GROI_CODE_REV")
        .ok()
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--abbrev=12"]))
        .unwrap_or_else(|| "unknown".to_string())
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn provenance_path_rewrites_extension() {
        assert_eq!(
            provenance_path(Path::new("/tmp/output/roi.kml")),
            Path::new("/tmp/output/roi.provenance.json")
        );
        assert_eq!(provenance_path(Path::new("seq")), Path::new("seq.provenance.json"));
    }

    #[test]
    fn sidecar_records_params_and_inputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("roi.kml");
        fs::write(&artifact, "").unwrap();
        let payload = Payload::new("run", json!({"threshold": 0.27}))
            .with_inputs([dir.path().join("a.csv")]);
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["command"], "run");
        assert_eq!(parsed["params"]["threshold"], 0.27);
        assert_eq!(parsed["groi_version"], groi::VERSION);
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert!(parsed["inputs"][0].as_str().unwrap().ends_with("a.csv"));
    }
}
