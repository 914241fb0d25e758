//! Mel-frequency cepstral coefficients with a fixed parameter set.
//!
//! The parameters below define the input shape the classifier is built for
//! and must stay the same for every sample of a corpus.

use crate::audio::TARGET_SAMPLE_RATE;
use mel_filter::{mel, NormalizationFactor};
use ndarray::Array2;
use once_cell::sync::Lazy;
use rustdct::DctPlanner;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

pub const N_FFT: usize = 2048;
pub const HOP_LENGTH: usize = 512;
pub const N_MELS: usize = 128;
/// Number of cepstral coefficients kept per frame.
pub const N_MFCC: usize = 20;
const AMIN: f32 = 1e-10;
const TOP_DB: f32 = 80.0;

static MEL_FILTERS: Lazy<Vec<Vec<f32>>> = Lazy::new(|| {
    mel::<f32>(
        TARGET_SAMPLE_RATE as usize,
        N_FFT,
        Some(N_MELS),
        None,
        None,
        false,
        NormalizationFactor::One,
    )
});

// periodic Hann
static WINDOW: Lazy<Vec<f32>> = Lazy::new(|| {
    (0..N_FFT)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / N_FFT as f32).cos())
        .collect()
});

/// Number of frames produced for a waveform of `len` samples.
pub fn frame_count(len: usize) -> usize {
    1 + len / HOP_LENGTH
}

/// Shape `(N_MFCC, frames)` of the matrix [`mfcc`] returns for `len` samples.
pub fn feature_shape(len: usize) -> (usize, usize) {
    (N_MFCC, frame_count(len))
}

/// Mel power spectrogram in decibels, shape `(N_MELS, frames)`.
///
/// Frames are centered: the signal is zero-padded by `N_FFT / 2` on both
/// sides before windowing.
pub fn log_mel_spectrogram(samples: &[f32]) -> Array2<f32> {
    let half = N_FFT / 2;
    let mut padded = vec![0.0f32; samples.len() + N_FFT];
    padded[half..half + samples.len()].copy_from_slice(samples);

    let frames = frame_count(samples.len());
    let mut fft_planner = FftPlanner::<f32>::new();
    let fft = fft_planner.plan_fft_forward(N_FFT);
    let mut buffer = vec![Complex::<f32>::new(0.0, 0.0); N_FFT];
    let mut spec = Array2::<f32>::zeros((N_MELS, frames));

    for t in 0..frames {
        let start = t * HOP_LENGTH;
        for (i, (slot, &w)) in buffer.iter_mut().zip(WINDOW.iter()).enumerate() {
            *slot = Complex::new(padded[start + i] * w, 0.0);
        }
        fft.process(&mut buffer);
        let power: Vec<f32> = buffer
            .iter()
            .take(N_FFT / 2 + 1)
            .map(|c| c.norm_sqr())
            .collect();

        for (m, filt) in MEL_FILTERS.iter().enumerate() {
            let energy: f32 = filt.iter().zip(&power).map(|(&w, &p)| w * p).sum();
            spec[[m, t]] = 10.0 * energy.max(AMIN).log10();
        }
    }

    let peak = spec.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let floor = peak - TOP_DB;
    spec.mapv_inplace(|v| v.max(floor));
    spec
}

/// Compute the MFCC matrix of `samples`, shape `(N_MFCC, frames)`.
///
/// Coefficients are the orthonormal DCT-II of each log-mel frame.
pub fn mfcc(samples: &[f32]) -> Array2<f32> {
    let log_mel = log_mel_spectrogram(samples);
    let frames = log_mel.ncols();
    let mut dct_planner = DctPlanner::<f32>::new();
    let dct = dct_planner.plan_dct2(N_MELS);

    let scale_first = (1.0 / N_MELS as f32).sqrt();
    let scale_rest = (2.0 / N_MELS as f32).sqrt();
    let mut coeffs = vec![0.0f32; N_MELS];
    let mut features = Array2::<f32>::zeros((N_MFCC, frames));

    for t in 0..frames {
        for (c, &v) in coeffs.iter_mut().zip(log_mel.column(t).iter()) {
            *c = v;
        }
        dct.process_dct2(&mut coeffs);
        for k in 0..N_MFCC {
            let scale = if k == 0 { scale_first } else { scale_rest };
            features[[k, t]] = coeffs[k] * scale;
        }
    }

    features
}
