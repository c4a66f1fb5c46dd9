//! Pipeline Regression Tests
//!
//! Exercises the full detection pipeline on a synthetic commissioning
//! scenario: a healthy training corpus of noisy unit-amplitude tones, and a
//! test corpus where a known subset of records is amplified to simulate
//! bearing degradation. Asserts on exact flagged indices, clamping behavior,
//! and the confidence/threshold relationship.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use envguard::baseline::{classify_corpus, train_reference_envelope};
use envguard::config::MonitorConfig;
use envguard::processing::preprocess;

const SAMPLE_RATE_HZ: f64 = 25_600.0;
const TONE_HZ: f64 = 5_000.0;
const SAMPLES: usize = 2_048;

/// Noisy tone with random phase, amplitude `amplitude`.
fn synth_signal(rng: &mut StdRng, noise: &Normal<f64>, amplitude: f64) -> Vec<f64> {
    let phase: f64 = rng.gen_range(0.0..2.0 * PI);
    let omega = 2.0 * PI * TONE_HZ / SAMPLE_RATE_HZ;
    (0..SAMPLES)
        .map(|i| amplitude * (omega * i as f64 + phase).sin() + noise.sample(rng))
        .collect()
}

/// Build the commissioning scenario: 400 healthy training signals, and a
/// 12-entry test corpus with amplified records at indices 3 and 7.
fn commissioning_scenario(seed: u64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.02).expect("valid noise distribution");

    let training: Vec<Vec<f64>> = (0..400)
        .map(|_| synth_signal(&mut rng, &noise, 1.0))
        .collect();

    let degraded_indices = vec![3, 7];
    let test: Vec<Vec<f64>> = (0..12)
        .map(|i| {
            let amplitude = if degraded_indices.contains(&i) { 5.0 } else { 1.0 };
            synth_signal(&mut rng, &noise, amplitude)
        })
        .collect();

    (training, test, degraded_indices)
}

#[test]
fn end_to_end_flags_exactly_the_degraded_signals() {
    let config = MonitorConfig::default();
    let (training, test, degraded_indices) = commissioning_scenario(7);

    // Request far more training signals than exist: clamps to 400 and proceeds
    let reference = train_reference_envelope(&training, 10_000, &config)
        .expect("training must succeed");
    assert_eq!(reference.signals_used, 400);
    assert_eq!(reference.len(), SAMPLES);
    assert!(reference.values.iter().all(|&v| v >= 0.0));

    let preprocessed: Vec<Vec<f64>> = test
        .iter()
        .map(|s| preprocess(s, &config).expect("preprocess must succeed"))
        .collect();

    let result = classify_corpus(&reference, &preprocessed, 0.95).expect("classification");

    assert_eq!(result.signals_tested, 12);
    assert_eq!(result.flagged_count(), 2);
    assert_eq!(result.flagged_indices(), degraded_indices);

    // Flagged scores sit above the threshold; the margin should be decisive
    for flagged in &result.flagged {
        assert!(flagged.mean_amplitude > result.threshold * 1.5);
    }
}

#[test]
fn classification_is_stable_across_seeds() {
    let config = MonitorConfig::default();
    for seed in [1, 42, 1234] {
        let (training, test, degraded_indices) = commissioning_scenario(seed);
        let reference =
            train_reference_envelope(&training, 400, &config).expect("training must succeed");
        let preprocessed: Vec<Vec<f64>> = test
            .iter()
            .map(|s| preprocess(s, &config).expect("preprocess must succeed"))
            .collect();
        let result = classify_corpus(&reference, &preprocessed, 0.95).expect("classification");
        assert_eq!(result.flagged_indices(), degraded_indices, "seed {seed}");
    }
}

#[test]
fn higher_confidence_flags_a_subset() {
    let config = MonitorConfig::default();
    let (training, test, _) = commissioning_scenario(99);

    let reference =
        train_reference_envelope(&training, 400, &config).expect("training must succeed");
    let preprocessed: Vec<Vec<f64>> = test
        .iter()
        .map(|s| preprocess(s, &config).expect("preprocess must succeed"))
        .collect();

    let loose = classify_corpus(&reference, &preprocessed, 0.80).expect("classification");
    let strict = classify_corpus(&reference, &preprocessed, 0.999).expect("classification");

    assert!(strict.threshold >= loose.threshold);
    let loose_indices = loose.flagged_indices();
    for idx in strict.flagged_indices() {
        assert!(loose_indices.contains(&idx));
    }
}

#[test]
fn all_zero_training_corpus_flags_any_energy() {
    let config = MonitorConfig::default();
    let training: Vec<Vec<f64>> = (0..5).map(|_| vec![0.0; 512]).collect();

    let reference =
        train_reference_envelope(&training, 5, &config).expect("training must succeed");
    assert!(reference.values.iter().all(|&v| v == 0.0));

    // Zero mean, zero std: the threshold collapses to zero
    assert_eq!(reference.threshold(0.95).expect("threshold"), 0.0);

    // Any nonzero preprocessed test signal gets flagged; a zero one does not
    let test = vec![vec![0.0; 512], vec![0.5; 512]];
    let result = classify_corpus(&reference, &test, 0.95).expect("classification");
    assert_eq!(result.flagged_indices(), vec![1]);
}
