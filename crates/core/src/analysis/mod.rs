//! Frequency analysis front end: turns raw PCM into the byte-valued bins the
//! beat detector and renderers consume.

mod filter;

use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

pub use filter::BassFilter;

use crate::{AudioConfig, BeatVizError, Result};

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32_768;

/// Short-time spectrum analyser producing `fft_size / 2` byte magnitudes.
///
/// Keeps the newest `fft_size` samples, applies a Blackman window, smooths
/// magnitudes over time and maps the decibel window
/// `[min_decibels, max_decibels]` linearly onto `0..=255`.
pub struct SpectrumAnalyser {
    config: AudioConfig,
    window: Vec<f32>,
    samples: Vec<f32>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
    fft: FftResources,
}

impl SpectrumAnalyser {
    pub fn new(config: &AudioConfig) -> Result<Self> {
        let size = config.fft_size;
        if !size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size) {
            return Err(BeatVizError::InvalidInput(
                "fft size must be a power of two between 32 and 32768",
            ));
        }
        if !(config.max_decibels > config.min_decibels) {
            return Err(BeatVizError::InvalidInput(
                "max decibels must be greater than min decibels",
            ));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);
        let fft = FftResources {
            input: plan.make_input_vec(),
            spectrum: plan.make_output_vec(),
            scratch: plan.make_scratch_vec(),
            plan,
        };

        let mut config = config.clone();
        config.smoothing = if config.smoothing.is_finite() {
            config.smoothing.clamp(0.0, 1.0)
        } else {
            AudioConfig::default().smoothing
        };

        Ok(Self {
            window: (0..size).map(|n| blackman_value(n, size)).collect(),
            samples: vec![0.0; size],
            smoothed: vec![0.0; size / 2],
            bytes: vec![0; size / 2],
            fft,
            config,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.samples.len()
    }

    pub fn bin_count(&self) -> usize {
        self.bytes.len()
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Appends PCM samples, discarding the oldest so exactly `fft_size`
    /// remain.
    pub fn push_samples(&mut self, block: &[f32]) {
        let size = self.samples.len();
        if block.len() >= size {
            self.samples.copy_from_slice(&block[block.len() - size..]);
            return;
        }
        self.samples.copy_within(block.len().., 0);
        self.samples[size - block.len()..].copy_from_slice(block);
    }

    /// Runs one analysis pass over the buffered samples and returns the new
    /// byte bins.
    pub fn analyse(&mut self) -> Result<&[u8]> {
        for ((slot, sample), weight) in self
            .fft
            .input
            .iter_mut()
            .zip(&self.samples)
            .zip(&self.window)
        {
            *slot = if sample.is_finite() { sample * weight } else { 0.0 };
        }

        self.fft.plan.process_with_scratch(
            &mut self.fft.input,
            &mut self.fft.spectrum,
            &mut self.fft.scratch,
        )?;

        let scale = 1.0 / self.samples.len() as f32;
        let smoothing = self.config.smoothing;
        let min_db = self.config.min_decibels;
        let range_db = self.config.max_decibels - min_db;

        for ((smoothed, byte), bin) in self
            .smoothed
            .iter_mut()
            .zip(self.bytes.iter_mut())
            .zip(&self.fft.spectrum)
        {
            let magnitude = bin.norm() * scale;
            *smoothed = smoothing * *smoothed + (1.0 - smoothing) * magnitude;
            *byte = decibels_to_byte(20.0 * smoothed.log10(), min_db, range_db);
        }

        Ok(&self.bytes)
    }

    /// Latest byte bins, lowest frequency first.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Smoothed linear magnitudes behind [`SpectrumAnalyser::bytes`].
    pub fn magnitudes(&self) -> &[f32] {
        &self.smoothed
    }

    /// Clears buffered audio and smoothing memory.
    pub fn reset(&mut self) {
        self.samples.fill(0.0);
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }
}

struct FftResources {
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl fmt::Debug for SpectrumAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyser")
            .field("fft_size", &self.samples.len())
            .field("smoothing", &self.config.smoothing)
            .field("min_decibels", &self.config.min_decibels)
            .field("max_decibels", &self.config.max_decibels)
            .finish()
    }
}

fn decibels_to_byte(db: f32, min_db: f32, range_db: f32) -> u8 {
    // log10(0) is -inf, which lands on 0 through the clamp.
    let scaled = 255.0 * (db - min_db) / range_db;
    if scaled.is_nan() {
        0
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}

fn blackman_value(index: usize, len: usize) -> f32 {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    let phase = 2.0 * PI * index as f32 / len as f32;
    A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos()
}
