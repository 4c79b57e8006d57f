//! Frame orchestration: the only place where audio, beat detection, patterns
//! and effects meet.

use std::{
    sync::mpsc::{self, Receiver, Sender},
    time::Duration,
};

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::{
    audio::{AudioSource, SampleProvider},
    beat::{BeatDetector, BeatTuning},
    color::{advance_hue, Rgb},
    config::{ColorMode, PatternMode, VisualConfig},
    effects::{Effect, FrequencyBars, ParticleField, WaveField},
    patterns::{render_pattern, FrameInput},
    preset::PresetLibrary,
    render::{Dimensions, Rect, Surface},
    Result,
};

/// Erase alpha on beat frames; the brighter clear reads as a flash.
pub const BEAT_FADE_ALPHA: f32 = 0.2;
/// Erase alpha on ordinary frames, leaving motion trails.
pub const FADE_ALPHA: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    /// No audio source; frames are not rendered.
    Idle,
    Running,
}

/// Requests applied between frames, at the top of the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    ReplaceConfig(Box<VisualConfig>),
    LoadPreset(String),
    Randomize,
    Stop,
}

/// Cloneable, thread-safe handle for queueing [`ControlCommand`]s.
#[derive(Debug, Clone)]
pub struct ControlSender {
    sender: Sender<ControlCommand>,
}

impl ControlSender {
    /// Queues `command`. Returns `false` once the render loop is gone.
    pub fn send(&self, command: ControlCommand) -> bool {
        self.sender.send(command).is_ok()
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub index: u64,
    pub beat: bool,
    pub energy: f32,
    pub threshold: f32,
    pub hue: f32,
    pub color: Rgb,
    pub pattern: PatternMode,
    pub particles: usize,
    pub waves: usize,
}

pub struct RenderLoop {
    state: LoopState,
    config: VisualConfig,
    presets: PresetLibrary,
    dimensions: Dimensions,
    detector: BeatDetector,
    provider: Option<Box<dyn SampleProvider>>,
    frame: Vec<u8>,
    waves: WaveField,
    particles: ParticleField,
    bars: FrequencyBars,
    rng: StdRng,
    commands: Receiver<ControlCommand>,
    sender: Sender<ControlCommand>,
    frames: u64,
}

impl RenderLoop {
    pub fn new(config: VisualConfig, dimensions: Dimensions, seed: u64) -> Self {
        let (sender, commands) = mpsc::channel();
        Self {
            state: LoopState::Idle,
            config: config.sanitized(),
            presets: PresetLibrary::new(),
            dimensions,
            detector: BeatDetector::new(BeatTuning::default()),
            provider: None,
            frame: Vec::new(),
            waves: WaveField::new(),
            particles: ParticleField::new(),
            bars: FrequencyBars,
            rng: StdRng::seed_from_u64(seed),
            commands,
            sender,
            frames: 0,
        }
    }

    pub fn with_presets(mut self, presets: PresetLibrary) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_tuning(mut self, tuning: BeatTuning) -> Self {
        self.detector = BeatDetector::new(tuning);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// The configuration the next frame will use, including the cycled hue.
    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn detector(&self) -> &BeatDetector {
        &self.detector
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn waves(&self) -> &WaveField {
        &self.waves
    }

    /// Latest audio frame, as read at the start of the last rendered frame.
    pub fn audio_frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn control(&self) -> ControlSender {
        ControlSender {
            sender: self.sender.clone(),
        }
    }

    /// Queues `command` for the next frame.
    pub fn queue(&self, command: ControlCommand) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.sender.send(command);
    }

    /// Acquires audio and moves to `Running`. On failure the loop stays
    /// `Idle` and the error is returned once; nothing retries.
    pub fn start(&mut self, source: &mut dyn AudioSource) -> Result<()> {
        if self.is_running() {
            tracing::debug!("render loop already running");
            return Ok(());
        }

        let (provider, band) = match source.acquire() {
            Ok(acquired) => acquired,
            Err(err) => {
                tracing::error!(%err, "could not start render loop");
                return Err(err);
            }
        };

        self.frame.clear();
        self.frame.resize(band.bin_count, 0);
        self.provider = Some(provider);
        self.detector.reset();
        self.frames = 0;
        self.state = LoopState::Running;
        tracing::info!(bins = band.bin_count, "render loop started");
        Ok(())
    }

    /// Returns to `Idle` and releases the audio provider. Idempotent.
    pub fn stop(&mut self) {
        if self.state == LoopState::Idle {
            return;
        }
        self.state = LoopState::Idle;
        self.provider = None;
        tracing::info!(frames = self.frames, "render loop stopped");
    }

    /// Renders one frame at `elapsed` since start. Returns `None` when the
    /// loop is idle, including when a queued `Stop` was just applied.
    pub fn frame(&mut self, surface: &mut dyn Surface, elapsed: Duration) -> Option<FrameReport> {
        self.apply_commands();
        if !self.is_running() {
            return None;
        }

        if let Some(provider) = self.provider.as_mut() {
            provider.read_into(&mut self.frame);
        }

        let now_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let beat = self
            .detector
            .detect(&self.frame, self.config.beat_sensitivity, now_ms);

        if self.config.color_mode == ColorMode::Cycle {
            let hue = advance_hue(self.config.color_hue, self.config.color_cycle_speed);
            self.config.color_hue = hue;
            self.config.color = self.config.hsl_color();
        }

        let fade = if beat { BEAT_FADE_ALPHA } else { FADE_ALPHA };
        surface.fill_rect(Rect::covering(self.dimensions), Rgb::BLACK.with_alpha(fade));

        let input = FrameInput::new(self.dimensions, &self.frame, beat, elapsed.as_secs_f32());
        render_pattern(surface, &input, &self.config);

        let effects: [&mut dyn Effect; 3] = [&mut self.waves, &mut self.particles, &mut self.bars];
        for effect in effects {
            if !effect.enabled(&self.config) {
                if effect.live() > 0 {
                    tracing::debug!(effect = effect.name(), live = effect.live(), "effect disabled");
                }
                effect.clear();
                continue;
            }
            if beat {
                effect.on_beat(self.dimensions, &self.config, &mut self.rng);
            }
            effect.advance_and_render(surface, &input, &self.config);
        }

        let report = FrameReport {
            index: self.frames,
            beat,
            energy: self.detector.last_energy(),
            threshold: self.detector.state().threshold(),
            hue: self.config.color_hue,
            color: self.config.color,
            pattern: self.config.pattern_mode,
            particles: self.particles.live(),
            waves: self.waves.live(),
        };
        self.frames += 1;
        Some(report)
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                ControlCommand::ReplaceConfig(config) => self.config = config.sanitized(),
                ControlCommand::LoadPreset(name) => {
                    self.config = self.presets.load(&name).sanitized();
                    tracing::info!(preset = %name, "preset loaded");
                }
                ControlCommand::Randomize => {
                    self.config = VisualConfig::randomized(&mut self.rng).sanitized();
                    tracing::info!("settings randomized");
                }
                ControlCommand::Stop => self.stop(),
            }
        }
    }
}

impl std::fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("state", &self.state)
            .field("dimensions", &self.dimensions)
            .field("frames", &self.frames)
            .field("particles", &self.particles.live())
            .field("waves", &self.waves.live())
            .finish()
    }
}
