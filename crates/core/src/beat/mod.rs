//! Adaptive-threshold beat detection over one frame of byte magnitudes.

use std::{collections::VecDeque, ops::Range};

/// Lower bound for the dynamic threshold.
pub const MIN_THRESHOLD: f32 = 0.15;
/// Upper bound for the dynamic threshold.
pub const MAX_THRESHOLD: f32 = 0.4;
/// Energy below this level never produces a beat.
pub const MIN_ENERGY: f32 = 0.15;
/// Minimum gap between two beats.
pub const REFRACTORY_MS: u64 = 150;
/// Length of the rolling energy window.
pub const HISTORY_LEN: usize = 8;
/// Value the rolling window starts out filled with.
pub const INITIAL_HISTORY: f32 = 0.1;
/// Threshold before any frame has been processed.
pub const INITIAL_THRESHOLD: f32 = 0.3;

/// Tunable constants of the detector. [`BeatTuning::default`] covers roughly
/// 100-400 Hz for a 2048 point transform.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTuning {
    /// Bin range summed into the energy value.
    pub band: Range<usize>,
    pub min_energy: f32,
    pub refractory_ms: u64,
    pub min_threshold: f32,
    pub max_threshold: f32,
}

impl Default for BeatTuning {
    fn default() -> Self {
        Self {
            band: 10..40,
            min_energy: MIN_ENERGY,
            refractory_ms: REFRACTORY_MS,
            min_threshold: MIN_THRESHOLD,
            max_threshold: MAX_THRESHOLD,
        }
    }
}

impl BeatTuning {
    /// Narrow sub-bass variant (bins 1-7, about 20-150 Hz) that reacts to
    /// kick drums only.
    pub fn sub_bass() -> Self {
        Self {
            band: 1..8,
            refractory_ms: 100,
            ..Self::default()
        }
    }

    /// Normalised energy of `frame` in the configured band. Bins past the end
    /// of the frame count as silence.
    pub fn energy(&self, frame: &[u8]) -> f32 {
        let width = self.band.end.saturating_sub(self.band.start);
        if width == 0 {
            return 0.0;
        }

        let sum: u32 = frame
            .iter()
            .skip(self.band.start)
            .take(width)
            .map(|&value| u32::from(value))
            .sum();

        sum as f32 / (width as f32 * 255.0)
    }
}

/// State carried from one frame to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatState {
    history: VecDeque<f32>,
    pub previous_energy: f32,
    /// Timestamp of the most recent beat, if any.
    pub last_beat_ms: Option<u64>,
    threshold: f32,
}

impl Default for BeatState {
    fn default() -> Self {
        Self::with_history([INITIAL_HISTORY; HISTORY_LEN])
    }
}

impl BeatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the rolling window with explicit values.
    pub fn with_history(history: [f32; HISTORY_LEN]) -> Self {
        Self {
            history: history.into_iter().collect(),
            previous_energy: 0.0,
            last_beat_ms: None,
            threshold: INITIAL_THRESHOLD,
        }
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn push_energy(&mut self, energy: f32) -> f32 {
        self.history.pop_front();
        self.history.push_back(energy);
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }
}

/// Stateful wrapper bundling tuning and state for one session.
#[derive(Debug, Clone, Default)]
pub struct BeatDetector {
    tuning: BeatTuning,
    state: BeatState,
}

impl BeatDetector {
    pub fn new(tuning: BeatTuning) -> Self {
        Self {
            tuning,
            state: BeatState::default(),
        }
    }

    /// Runs [`detect_beat`] against the owned state.
    pub fn detect(&mut self, frame: &[u8], sensitivity: f32, now_ms: u64) -> bool {
        detect_beat(frame, &mut self.state, sensitivity, now_ms, &self.tuning)
    }

    pub fn state(&self) -> &BeatState {
        &self.state
    }

    pub fn tuning(&self) -> &BeatTuning {
        &self.tuning
    }

    /// Energy of the most recently analysed frame.
    pub fn last_energy(&self) -> f32 {
        self.state.previous_energy
    }

    pub fn reset(&mut self) {
        self.state = BeatState::default();
    }
}

/// Classifies one frame as beat or no beat, updating `state` in place.
///
/// A beat needs band energy above the silence floor, at least
/// `refractory_ms` since the previous beat, energy above the clamped dynamic
/// threshold and a rising edge relative to the previous frame. Frames cut
/// short by the floor or the refractory gap leave the window untouched.
pub fn detect_beat(
    frame: &[u8],
    state: &mut BeatState,
    sensitivity: f32,
    now_ms: u64,
    tuning: &BeatTuning,
) -> bool {
    let energy = tuning.energy(frame);

    if energy < tuning.min_energy {
        state.previous_energy = energy;
        return false;
    }

    if let Some(last) = state.last_beat_ms {
        if now_ms.saturating_sub(last) < tuning.refractory_ms {
            state.previous_energy = energy;
            return false;
        }
    }

    let average = state.push_energy(energy);
    let sensitivity = if sensitivity.is_finite() { sensitivity } else { 0.0 };
    state.threshold = (average * sensitivity).clamp(tuning.min_threshold, tuning.max_threshold);

    let beat = energy > state.threshold && energy > state.previous_energy;
    if beat {
        state.last_beat_ms = Some(now_ms);
        tracing::debug!(energy, threshold = state.threshold, now_ms, "beat");
    }

    state.previous_energy = energy;
    beat
}
