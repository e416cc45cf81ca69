//! Coordinate record source: headerless CSV, one sample per row.
//!
//! Rows are `x,y` or `x,y,support`; a support of `n` expands to `n` identical
//! samples before aggregation. Rows with any other field count are skipped.
//! Supports above [`MAX_ROW_SUPPORT`] are rejected as malformed.

use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use groi::Coordinate;
use std::fs;
use std::path::{Path, PathBuf};

/// Largest support a single row may carry.
pub const MAX_ROW_SUPPORT: u64 = 1_000_000;

/// Load and expand every sample of one CSV file.
pub fn load_coordinates(path: &Path) -> Result<Vec<Coordinate>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match parse_record(&record)
            .with_context(|| format!("{}:{}", path.display(), line))?
        {
            Some((coord, support)) => {
                let n = usize::try_from(support)
                    .with_context(|| format!("{}:{}: support {support}", path.display(), line))?;
                out.try_reserve(n)
                    .with_context(|| format!("{}:{}: expanding {n} samples", path.display(), line))?;
                out.extend(std::iter::repeat(coord).take(n));
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(file = %path.display(), skipped, "skipped rows without 2 or 3 fields");
    }
    Ok(out)
}

/// `Ok(None)` for rows that are not samples (wrong arity).
fn parse_record(record: &StringRecord) -> Result<Option<(Coordinate, u64)>> {
    let support = match record.len() {
        2 => 1,
        3 => record[2]
            .parse::<u64>()
            .map_err(|e| anyhow!("support {:?}: {e}", &record[2]))?,
        _ => return Ok(None),
    };
    if support > MAX_ROW_SUPPORT {
        bail!("support {support} exceeds {MAX_ROW_SUPPORT}");
    }
    let x: f64 = record[0]
        .parse()
        .map_err(|e| anyhow!("x {:?}: {e}", &record[0]))?;
    let y: f64 = record[1]
        .parse()
        .map_err(|e| anyhow!("y {:?}: {e}", &record[1]))?;
    let coord = Coordinate::new(x, y);
    if !coord.is_finite() {
        bail!("non-finite coordinate ({x}, {y})");
    }
    Ok(Some((coord, support)))
}

/// Regular files under `input` sorted by name, or `input` itself if it is a file.
pub fn list_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    let meta = fs::metadata(input).with_context(|| format!("inspecting {}", input.display()))?;
    if meta.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(input).with_context(|| format!("listing {}", input.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn mixed_rows_expand_support() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("poi.csv");
        fs::write(&path, "12.5,41.9\n\n12.6, 41.8 ,3\n1,2,3,4\n").unwrap();
        let pts = load_coordinates(&path).unwrap();
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[0], Coordinate::new(12.5, 41.9));
        assert!(pts[1..].iter().all(|p| *p == Coordinate::new(12.6, 41.8)));
    }

    #[test]
    fn malformed_number_names_the_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "1,2\n1,abc\n").unwrap();
        let err = load_coordinates(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("bad.csv:2"), "{msg}");
    }

    #[test]
    fn negative_support_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("neg.csv");
        fs::write(&path, "1,2,-1\n").unwrap();
        assert!(load_coordinates(&path).is_err());
    }

    #[test]
    fn huge_support_is_an_error_not_a_crash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.csv");
        fs::write(&path, "1,2\n1,2,18446744073709551615\n").unwrap();
        let msg = format!("{:#}", load_coordinates(&path).unwrap_err());
        assert!(msg.contains("huge.csv:2"), "{msg}");
        assert!(msg.contains("exceeds"), "{msg}");

        fs::write(&path, format!("1,2,{MAX_ROW_SUPPORT}\n")).unwrap();
        assert_eq!(load_coordinates(&path).unwrap().len(), MAX_ROW_SUPPORT as usize);
    }

    #[test]
    fn lists_files_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let files = list_inputs(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert_eq!(list_inputs(&files[0]).unwrap(), vec![files[0].clone()]);
    }
}
