//! Zero-phase Butterworth bandpass filtering
//!
//! Conditions raw accelerometer signals before envelope extraction. The filter
//! is designed as cascaded second-order sections (analog Butterworth prototype,
//! lowpass-to-bandpass transform, bilinear transform) and applied
//! forward-backward so the passband carries no phase distortion.
//!
//! # Example
//!
//! ```ignore
//! use envguard::processing::bandpass_filtfilt;
//!
//! let samples: Vec<f64> = read_accelerometer_channel();
//! let filtered = bandpass_filtfilt(&samples, 1000.0, 10000.0, 25600.0, 4)?;
//! assert_eq!(filtered.len(), samples.len());
//! ```

use num_complex::Complex64;
use std::f64::consts::PI;

use super::PipelineError;
use crate::config::MonitorConfig;

/// Default bandpass filter order (number of biquad sections).
pub const DEFAULT_FILTER_ORDER: usize = 4;

// ============================================================================
// Second-Order Sections
// ============================================================================

/// A second-order section (biquad).
///
/// Transfer function: `H(z) = (b0 + b1·z⁻¹ + b2·z⁻²) / (1 + a1·z⁻¹ + a2·z⁻²)`
#[derive(Clone, Debug)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// Apply this section using Direct Form II Transposed.
    fn filter(&self, data: &[f64], zi: [f64; 2]) -> (Vec<f64>, [f64; 2]) {
        let mut output = Vec::with_capacity(data.len());
        let (mut z1, mut z2) = (zi[0], zi[1]);

        for &x in data {
            let y = self.b0 * x + z1;
            z1 = self.b1 * x - self.a1 * y + z2;
            z2 = self.b2 * x - self.a2 * y;
            output.push(y);
        }

        (output, [z1, z2])
    }

    /// Steady-state initial conditions for a step input of value `x0`.
    ///
    /// At steady state with `x[n] = y[n] = x0`:
    ///   `z2 = (b2 - a2)·x0`
    ///   `z1 = (b1 - a1)·x0 + z2`
    fn steady_state_zi(&self, x0: f64) -> [f64; 2] {
        let z2 = (self.b2 - self.a2) * x0;
        let z1 = (self.b1 - self.a1) * x0 + z2;
        [z1, z2]
    }
}

// ============================================================================
// Butterworth Bandpass Design
// ============================================================================

/// Design a Butterworth bandpass filter as cascaded biquads.
///
/// Standard three-step design:
/// 1. Analog prototype poles on the unit circle, `θ_k = π(2k + n + 1) / 2n`
/// 2. Lowpass-to-bandpass transform `s → (s² + ω₀²) / (s·bw)` with pre-warped
///    band edges, doubling the pole count
/// 3. Bilinear transform `z = (1 + s) / (1 - s)`, conjugate poles paired into
///    sections with zeros at `z = ±1`, gain normalized at the geometric
///    center frequency
///
/// An order-`n` bandpass yields `n` biquad sections (2n poles).
fn design_bandpass_sos(
    low_hz: f64,
    high_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Result<Vec<Biquad>, PipelineError> {
    if order == 0 {
        return Err(PipelineError::InvalidOrder(order));
    }
    let nyquist = sample_rate_hz / 2.0;
    if !(low_hz > 0.0 && low_hz < high_hz && high_hz < nyquist) {
        return Err(PipelineError::InvalidBand {
            low: low_hz,
            high: high_hz,
            nyquist,
        });
    }

    // Pre-warp band edges for the bilinear transform
    let u_low = (PI * low_hz / sample_rate_hz).tan();
    let u_high = (PI * high_hz / sample_rate_hz).tan();
    let bw = u_high - u_low;
    let w0_sq = u_high * u_low;

    // Analog prototype poles (left half-plane, unit circle)
    let prototype: Vec<Complex64> = (0..order)
        .map(|k| {
            let theta = PI * (2.0 * k as f64 + order as f64 + 1.0) / (2.0 * order as f64);
            Complex64::from_polar(1.0, theta)
        })
        .collect();

    // Bandpass transform: each prototype pole p yields the two roots of
    // s² - p·bw·s + ω₀² = 0
    let mut poles_z = Vec::with_capacity(2 * order);
    for p in prototype {
        let b = -p * bw;
        let c = Complex64::new(w0_sq, 0.0);
        let disc = (b * b - 4.0 * c).sqrt();
        for s in [(-b + disc) / 2.0, (-b - disc) / 2.0] {
            // Bilinear transform to the z-plane
            let one = Complex64::new(1.0, 0.0);
            poles_z.push((one + s) / (one - s));
        }
    }

    // Pair conjugate poles into biquads. Each section takes one zero at z = +1
    // and one at z = -1, giving numerator (z² - 1).
    let mut sections = Vec::with_capacity(order);
    let mut used = vec![false; poles_z.len()];
    for i in 0..poles_z.len() {
        if used[i] {
            continue;
        }
        let mut best_j = i;
        let mut min_err = f64::MAX;
        for j in (i + 1)..poles_z.len() {
            if used[j] {
                continue;
            }
            let err = (poles_z[i].re - poles_z[j].re).abs() + (poles_z[i].im + poles_z[j].im).abs();
            if err < min_err {
                min_err = err;
                best_j = j;
            }
        }
        used[i] = true;
        used[best_j] = true;

        let p1 = poles_z[i];
        let p2 = poles_z[best_j];
        sections.push(Biquad {
            b0: 1.0,
            b1: 0.0,
            b2: -1.0,
            a1: -(p1 + p2).re,
            a2: (p1 * p2).re,
        });
    }

    // Normalize cascade gain to 1.0 at the geometric center frequency
    let center_hz = (low_hz * high_hz).sqrt();
    let z = Complex64::from_polar(1.0, 2.0 * PI * center_hz / sample_rate_hz);
    let mut mag = 1.0;
    for s in &sections {
        let num = s.b0 * z * z + s.b1 * z + s.b2;
        let den = z * z + s.a1 * z + s.a2;
        mag *= (num / den).norm();
    }
    let section_gain = (1.0 / mag).powf(1.0 / sections.len() as f64);
    for s in &mut sections {
        s.b0 *= section_gain;
        s.b1 *= section_gain;
        s.b2 *= section_gain;
    }

    Ok(sections)
}

// ============================================================================
// Zero-Phase Filtering (filtfilt)
// ============================================================================

/// Minimum signal length required for zero-phase filtering at a given order.
///
/// The forward-backward pass reflect-pads the signal by `3 · 2 · order`
/// samples on each side; the input must be strictly longer than the pad.
pub fn min_signal_len(order: usize) -> usize {
    3 * 2 * order + 1
}

/// Reflect-pad the signal about its endpoints to suppress edge transients.
fn reflect_pad(data: &[f64], pad_len: usize) -> Vec<f64> {
    let n = data.len();
    let mut padded = Vec::with_capacity(n + 2 * pad_len);

    for i in (1..=pad_len).rev() {
        padded.push(2.0 * data[0] - data[i]);
    }
    padded.extend_from_slice(data);
    for i in 1..=pad_len {
        padded.push(2.0 * data[n - 1] - data[n - 1 - i]);
    }

    padded
}

/// Forward-backward filtering over a biquad cascade with reflect padding and
/// steady-state initial conditions at both edges.
fn sosfiltfilt(data: &[f64], sos: &[Biquad]) -> Result<Vec<f64>, PipelineError> {
    let n = data.len();
    let pad_len = 3 * 2 * sos.len();
    if n <= pad_len {
        return Err(PipelineError::SignalTooShort {
            needed: pad_len,
            available: n,
        });
    }

    // Non-finite samples would propagate through the whole IIR state
    let cleaned: Vec<f64>;
    let data: &[f64] = if data.iter().all(|x| x.is_finite()) {
        data
    } else {
        tracing::debug!("Non-finite samples zeroed before filtering");
        cleaned = data
            .iter()
            .map(|&x| if x.is_finite() { x } else { 0.0 })
            .collect();
        cleaned.as_slice()
    };

    let padded = reflect_pad(data, pad_len);

    // Forward pass
    let mut forward = padded;
    for section in sos {
        let zi = section.steady_state_zi(forward[0]);
        let (filtered, _) = section.filter(&forward, zi);
        forward = filtered;
    }

    // Backward pass
    forward.reverse();
    let mut backward = forward;
    for section in sos {
        let zi = section.steady_state_zi(backward[0]);
        let (filtered, _) = section.filter(&backward, zi);
        backward = filtered;
    }
    backward.reverse();

    Ok(backward[pad_len..pad_len + n].to_vec())
}

// ============================================================================
// Public Surface
// ============================================================================

/// Apply a zero-phase Butterworth bandpass filter.
///
/// Frequency content outside `[low_hz, high_hz]` is attenuated; the output has
/// the same length as the input and no phase shift across the passband.
///
/// # Arguments
/// * `signal` - Raw samples (acceleration)
/// * `low_hz` / `high_hz` - Passband edges, `0 < low < high < sample_rate/2`
/// * `sample_rate_hz` - Sampling rate in Hz
/// * `order` - Filter order (biquad sections), typically [`DEFAULT_FILTER_ORDER`]
///
/// # Errors
/// [`PipelineError::InvalidBand`] / [`PipelineError::InvalidOrder`] for bad
/// parameters, [`PipelineError::EmptySignal`] for empty input, and
/// [`PipelineError::SignalTooShort`] when the signal cannot support the
/// reflect padding the chosen order requires.
pub fn bandpass_filtfilt(
    signal: &[f64],
    low_hz: f64,
    high_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Result<Vec<f64>, PipelineError> {
    if signal.is_empty() {
        return Err(PipelineError::EmptySignal);
    }
    let sos = design_bandpass_sos(low_hz, high_hz, sample_rate_hz, order)?;
    sosfiltfilt(signal, &sos)
}

/// Bandpass filter then full-wave rectify: `|bandpass_filtfilt(signal)|`.
///
/// This is the preprocessing applied to every signal before envelope
/// extraction and test-signal scoring. Pure function.
pub fn preprocess(signal: &[f64], config: &MonitorConfig) -> Result<Vec<f64>, PipelineError> {
    let filtered = bandpass_filtfilt(
        signal,
        config.band_low_hz,
        config.band_high_hz,
        config.sample_rate_hz,
        config.filter_order,
    )?;
    Ok(filtered.into_iter().map(f64::abs).collect())
}

// ============================================================================
// Tests
// ============================================================================
