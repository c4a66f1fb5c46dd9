//! Vibration record ingestion from CSV files
//!
//! One record per file, columns `horizontal,vertical`, one sample pair per
//! line. A corpus directory is read in sorted filename order so corpus
//! indices are stable across runs.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::processing::PipelineError;
use crate::types::{ChannelSelector, VibrationRecord};

/// Read one vibration record from a CSV file.
///
/// The header line and blank lines are skipped; malformed lines are logged
/// and skipped rather than aborting the record.
pub fn read_record(path: &Path) -> Result<VibrationRecord, PipelineError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    let mut line_num = 0;

    for line_result in reader.lines() {
        line_num += 1;
        let line = line_result?;

        if line_num == 1 && line.starts_with("horizontal") {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_sample_pair(&line) {
            Some((h, v)) => {
                horizontal.push(h);
                vertical.push(v);
            }
            None => {
                tracing::warn!(
                    file = %path.display(),
                    line = line_num,
                    "Skipping malformed CSV line"
                );
            }
        }
    }

    Ok(VibrationRecord {
        horizontal,
        vertical,
    })
}

/// Parse a `horizontal,vertical` sample pair.
fn parse_sample_pair(line: &str) -> Option<(f64, f64)> {
    let mut fields = line.split(',');
    let h = fields.next()?.trim().parse::<f64>().ok()?;
    let v = fields.next()?.trim().parse::<f64>().ok()?;
    Some((h, v))
}

/// Load all records from a corpus directory, in sorted filename order.
///
/// Only `*.csv` entries are considered. An empty directory yields an empty
/// corpus (the trainer rejects it downstream).
pub fn load_records(dir: &Path) -> Result<Vec<VibrationRecord>, PipelineError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in &paths {
        records.push(read_record(path)?);
    }

    tracing::info!(count = records.len(), dir = %dir.display(), "Loaded vibration records");
    Ok(records)
}

/// Load a corpus directory and select one channel per record.
pub fn load_corpus(
    dir: &Path,
    channel: ChannelSelector,
) -> Result<Vec<Vec<f64>>, PipelineError> {
    let records = load_records(dir)?;
    Ok(records
        .into_iter()
        .map(|r| match channel {
            ChannelSelector::Horizontal => r.horizontal,
            ChannelSelector::Vertical => r.vertical,
        })
        .collect())
}

/// Write one vibration record as CSV (used by the simulator and tests).
pub fn write_record(path: &Path, record: &VibrationRecord) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    writeln!(file, "horizontal,vertical")?;
    for (h, v) in record.horizontal.iter().zip(record.vertical.iter()) {
        writeln!(file, "{h},{v}")?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec_0000.csv");

        let record = VibrationRecord {
            horizontal: vec![0.1, -0.2, 0.3],
            vertical: vec![1.0, 2.0, -3.0],
        };
        write_record(&path, &record).unwrap();

        let loaded = read_record(&path).unwrap();
        assert_eq!(loaded.horizontal, record.horizontal);
        assert_eq!(loaded.vertical, record.vertical);
    }

    #[test]
    fn test_corpus_loads_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();

        // Write out of order; load must sort by filename
        for (name, value) in [("rec_0002.csv", 2.0), ("rec_0000.csv", 0.0), ("rec_0001.csv", 1.0)]
        {
            let record = VibrationRecord {
                horizontal: vec![value],
                vertical: vec![-value],
            };
            write_record(&dir.path().join(name), &record).unwrap();
        }

        let corpus = load_corpus(dir.path(), ChannelSelector::Horizontal).unwrap();
        assert_eq!(corpus, vec![vec![0.0], vec![1.0], vec![2.0]]);

        let vertical = load_corpus(dir.path(), ChannelSelector::Vertical).unwrap();
        assert_eq!(vertical, vec![vec![0.0], vec![-1.0], vec![-2.0]]);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec_0000.csv");
        std::fs::write(&path, "horizontal,vertical\n0.5,1.5\nnot,numbers\n\n0.25,0.75\n")
            .unwrap();

        let record = read_record(&path).unwrap();
        assert_eq!(record.horizontal, vec![0.5, 0.25]);
        assert_eq!(record.vertical, vec![1.5, 0.75]);
    }

    #[test]
    fn test_non_csv_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a record").unwrap();
        write_record(
            &dir.path().join("rec_0000.csv"),
            &VibrationRecord {
                horizontal: vec![1.0],
                vertical: vec![2.0],
            },
        )
        .unwrap();

        let corpus = load_corpus(dir.path(), ChannelSelector::Horizontal).unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_empty_directory_yields_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = load_corpus(dir.path(), ChannelSelector::Horizontal).unwrap();
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");
        assert!(matches!(
            load_corpus(&missing, ChannelSelector::Horizontal),
            Err(PipelineError::Io(_))
        ));
    }
}
