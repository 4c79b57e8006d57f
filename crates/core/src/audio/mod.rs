//! Audio acquisition: the source/provider contract the render loop depends
//! on, plus a thread-safe engine that capture backends feed with PCM.

mod synthetic;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

pub use synthetic::{SignalGenerator, SyntheticInput};

use crate::{
    analysis::{BassFilter, SpectrumAnalyser},
    AudioConfig, AudioUnavailable, BeatVizError, Result,
};

/// Shape of the analysis the acquired provider delivers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandConfig {
    pub sample_rate: u32,
    pub fft_size: usize,
    pub bin_count: usize,
    pub bass_frequency: f32,
    pub bass_quality: f32,
}

impl BandConfig {
    /// Width of one bin in Hz.
    pub fn bin_hz(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size.max(1) as f32
    }
}

/// Delivers the newest frequency frame on demand.
pub trait SampleProvider: Send {
    fn bin_count(&self) -> usize;

    /// Overwrites `buffer` with the newest bins. Never blocks on new audio;
    /// bins beyond what the provider produces are zeroed.
    fn read_into(&mut self, buffer: &mut [u8]);
}

/// One-time setup step that opens an input and hands back its provider.
pub trait AudioSource {
    fn acquire(&mut self) -> Result<(Box<dyn SampleProvider>, BandConfig)>;
}

/// Source that always fails, standing in for a refused or missing device.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableSource(pub AudioUnavailable);

impl AudioSource for UnavailableSource {
    fn acquire(&mut self) -> Result<(Box<dyn SampleProvider>, BandConfig)> {
        Err(BeatVizError::AudioUnavailable(self.0))
    }
}

struct AnalysisState {
    analyser: SpectrumAnalyser,
    filter: BassFilter,
    filtered: Vec<f32>,
    /// Samples arrived since the last analysis pass.
    dirty: bool,
}

impl AnalysisState {
    fn push(&mut self, samples: &[f32]) {
        self.filtered.clear();
        self.filtered.extend_from_slice(samples);
        self.filter.process_block(&mut self.filtered);
        self.analyser.push_samples(&self.filtered);
        self.dirty = true;
    }

    fn refresh(&mut self) -> &[u8] {
        if self.dirty {
            self.dirty = false;
            if let Err(err) = self.analyser.analyse() {
                tracing::warn!(%err, "spectrum analysis failed; keeping previous frame");
            }
        }
        self.analyser.bytes()
    }
}

/// High level audio engine façade.
///
/// Capture callbacks push PCM through [`AudioEngine::push_samples`] from any
/// thread; the render loop reads spectra through the provider returned by
/// [`AudioSource::acquire`].
pub struct AudioEngine {
    config: AudioConfig,
    shared: Arc<Mutex<AnalysisState>>,
}

impl AudioEngine {
    /// Creates an engine with the bass filter at `bass_frequency` Hz and Q
    /// `bass_quality`.
    pub fn new(config: &AudioConfig, bass_frequency: f32, bass_quality: f32) -> Result<Self> {
        let analyser = SpectrumAnalyser::new(config)?;
        let filter = BassFilter::new(config.sample_rate, bass_frequency, bass_quality);
        Ok(Self {
            config: analyser.config().clone(),
            shared: Arc::new(Mutex::new(AnalysisState {
                analyser,
                filter,
                filtered: Vec::new(),
                dirty: false,
            })),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Filters a block of PCM and appends it to the analysis window.
    pub fn push_samples(&self, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let mut state = self.lock_analysis()?;
        state.push(samples);
        Ok(())
    }

    /// Moves the bass filter to a new cutoff and Q, e.g. after a settings
    /// change.
    pub fn retune_bass(&self, frequency: f32, quality: f32) -> Result<()> {
        let mut state = self.lock_analysis()?;
        state.filter.retune(frequency, quality);
        Ok(())
    }

    /// Current band layout, reflecting any clamping of the filter settings.
    pub fn band_config(&self) -> Result<BandConfig> {
        let state = self.lock_analysis()?;
        Ok(BandConfig {
            sample_rate: self.config.sample_rate,
            fft_size: state.analyser.fft_size(),
            bin_count: state.analyser.bin_count(),
            bass_frequency: state.filter.frequency(),
            bass_quality: state.filter.quality(),
        })
    }

    /// Drops buffered audio, smoothing memory and filter state.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock_analysis()?;
        state.analyser.reset();
        state.filter.reset();
        state.dirty = false;
        Ok(())
    }

    /// A new reader over the shared analysis.
    pub fn handle(&self) -> AnalysisHandle {
        AnalysisHandle::new(self.shared.clone())
    }

    fn lock_analysis(&self) -> Result<MutexGuard<'_, AnalysisState>> {
        self.shared
            .lock()
            .map_err(|_| BeatVizError::msg("analysis pipeline has been poisoned"))
    }
}

impl AudioSource for AudioEngine {
    fn acquire(&mut self) -> Result<(Box<dyn SampleProvider>, BandConfig)> {
        let band = self.band_config()?;
        tracing::info!(
            sample_rate = band.sample_rate,
            fft_size = band.fft_size,
            bass_hz = band.bass_frequency,
            "audio input acquired"
        );
        Ok((Box::new(self.handle()), band))
    }
}

impl std::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("sample_rate", &self.config.sample_rate)
            .field("fft_size", &self.config.fft_size)
            .finish()
    }
}

/// Shared, thread-safe view over the analysis managed by [`AudioEngine`].
#[derive(Clone)]
pub struct AnalysisHandle {
    shared: Arc<Mutex<AnalysisState>>,
}

impl AnalysisHandle {
    fn new(shared: Arc<Mutex<AnalysisState>>) -> Self {
        Self { shared }
    }

    fn lock(&self) -> MutexGuard<'_, AnalysisState> {
        // A panicking capture thread must not take the render loop with it;
        // the analysis state is still structurally valid.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SampleProvider for AnalysisHandle {
    fn bin_count(&self) -> usize {
        self.lock().analyser.bin_count()
    }

    fn read_into(&mut self, buffer: &mut [u8]) {
        let mut state = self.lock();
        let bins = state.refresh();
        let shared = bins.len().min(buffer.len());
        buffer[..shared].copy_from_slice(&bins[..shared]);
        buffer[shared..].fill(0);
    }
}

impl std::fmt::Debug for AnalysisHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisHandle").finish()
    }
}
