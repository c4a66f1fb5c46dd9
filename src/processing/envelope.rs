//! Amplitude envelope via the analytic signal
//!
//! Computes the instantaneous amplitude of a real signal using the FFT-based
//! analytic signal: zero the negative-frequency half of the spectrum, double
//! the positive half, inverse-transform, and take the per-sample magnitude.
//! For a narrowband oscillation the result tracks the oscillation's amplitude,
//! which is what exposes the amplitude modulation caused by mechanical
//! degradation.
//!
//! The input should already be bandpass filtered; instantaneous amplitude is
//! only meaningful for narrowband content.

use num_complex::Complex64;
use rustfft::FftPlanner;

use super::PipelineError;

/// Compute the analytic signal `a(t) = x(t) + i·H[x(t)]`.
///
/// The real part reproduces the input; the imaginary part is the Hilbert
/// transform (a 90° phase shift of every frequency component).
///
/// Spectrum weighting: DC and Nyquist bins kept as-is, positive-frequency
/// bins doubled, negative-frequency bins zeroed.
///
/// # Errors
/// [`PipelineError::EmptySignal`] for empty input.
pub fn analytic_signal(signal: &[f64]) -> Result<Vec<Complex64>, PipelineError> {
    let n = signal.len();
    if n == 0 {
        return Err(PipelineError::EmptySignal);
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    forward.process(&mut buffer);

    // Analytic-signal weighting
    let half = n / 2;
    if n % 2 == 0 {
        // DC (0) and Nyquist (n/2) kept, 1..n/2 doubled, rest zeroed
        for bin in buffer.iter_mut().take(half).skip(1) {
            *bin *= 2.0;
        }
        for bin in buffer.iter_mut().skip(half + 1) {
            *bin = Complex64::new(0.0, 0.0);
        }
    } else {
        // DC kept, 1..=(n-1)/2 doubled, rest zeroed
        for bin in buffer.iter_mut().take(half + 1).skip(1) {
            *bin *= 2.0;
        }
        for bin in buffer.iter_mut().skip(half + 1) {
            *bin = Complex64::new(0.0, 0.0);
        }
    }

    inverse.process(&mut buffer);

    // rustfft does not normalize the inverse transform
    let scale = 1.0 / n as f64;
    for v in &mut buffer {
        *v *= scale;
    }

    Ok(buffer)
}

/// Compute the instantaneous amplitude envelope `|a(t)|`.
///
/// Output is non-negative and the same length as the input; a constant-zero
/// input yields a zero envelope.
///
/// # Errors
/// [`PipelineError::EmptySignal`] for empty input.
pub fn amplitude_envelope(signal: &[f64]) -> Result<Vec<f64>, PipelineError> {
    let analytic = analytic_signal(signal)?;
    Ok(analytic.iter().map(|a| a.norm()).collect())
}

// ============================================================================
// Tests
// ============================================================================
