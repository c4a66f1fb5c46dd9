//! Ingestion & Persistence Integration Tests
//!
//! Writes vibration records to disk in the CSV record format, loads them back
//! as a corpus, trains a reference envelope, and round-trips the envelope
//! through JSON persistence, the same path the CLI binaries take.

use std::f64::consts::PI;

use envguard::baseline::train_reference_envelope;
use envguard::config::MonitorConfig;
use envguard::ingest;
use envguard::types::{ChannelSelector, ReferenceEnvelope, VibrationRecord};

fn tone_record(freq: f64, amplitude: f64, samples: usize, fs: f64) -> VibrationRecord {
    let omega = 2.0 * PI * freq / fs;
    VibrationRecord {
        horizontal: (0..samples).map(|i| amplitude * (omega * i as f64).sin()).collect(),
        vertical: (0..samples).map(|i| amplitude * (omega * i as f64).cos()).collect(),
    }
}

#[test]
fn corpus_to_reference_to_disk_and_back() {
    let config = MonitorConfig::default();
    let dir = tempfile::tempdir().expect("tempdir");
    let train_dir = dir.path().join("train");

    for i in 0..4 {
        let record = tone_record(5_000.0, 1.0, 1_024, config.sample_rate_hz);
        ingest::write_record(&train_dir.join(format!("rec_{i:04}.csv")), &record)
            .expect("write record");
    }

    let corpus =
        ingest::load_corpus(&train_dir, ChannelSelector::Horizontal).expect("load corpus");
    assert_eq!(corpus.len(), 4);
    assert_eq!(corpus[0].len(), 1_024);

    let reference =
        train_reference_envelope(&corpus, 4, &config).expect("training must succeed");
    assert_eq!(reference.signals_used, 4);

    let reference_path = dir.path().join("state/reference.json");
    reference.save_to_file(&reference_path).expect("save");

    let loaded = ReferenceEnvelope::load_from_file(&reference_path).expect("load");
    assert_eq!(loaded.signals_used, reference.signals_used);
    assert_eq!(loaded.len(), reference.len());
    for (a, b) in loaded.values.iter().zip(reference.values.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn channel_selection_changes_the_corpus() {
    let config = MonitorConfig::default();
    let dir = tempfile::tempdir().expect("tempdir");
    let train_dir = dir.path().join("train");

    // Horizontal carries the tone; vertical is flat
    for i in 0..2 {
        let mut record = tone_record(5_000.0, 2.0, 512, config.sample_rate_hz);
        record.vertical = vec![0.0; 512];
        ingest::write_record(&train_dir.join(format!("rec_{i:04}.csv")), &record)
            .expect("write record");
    }

    let horizontal =
        ingest::load_corpus(&train_dir, ChannelSelector::Horizontal).expect("load corpus");
    let vertical =
        ingest::load_corpus(&train_dir, ChannelSelector::Vertical).expect("load corpus");

    let h_ref = train_reference_envelope(&horizontal, 2, &config).expect("train horizontal");
    let v_ref = train_reference_envelope(&vertical, 2, &config).expect("train vertical");

    assert!(h_ref.mean().expect("mean") > 1.0);
    assert!(v_ref.mean().expect("mean") < 1e-9);
}
