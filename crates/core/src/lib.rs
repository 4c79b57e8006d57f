//! Core library for the Beat Visualiser.
//!
//! Audio is analysed into byte-valued frequency frames, classified into a
//! beat pulse and turned into one frame of pattern and effect drawing per
//! tick. Each module owns one stage of that pipeline; [`RenderLoop`] is the
//! only place they are wired together.

pub mod analysis;
pub mod audio;
pub mod beat;
pub mod color;
pub mod config;
pub mod effects;
pub mod error;
pub mod patterns;
pub mod preset;
pub mod render;
pub mod render_loop;
pub mod store;
pub mod timeline;

pub use analysis::{BassFilter, SpectrumAnalyser};
pub use audio::{
    AnalysisHandle, AudioEngine, AudioSource, BandConfig, SampleProvider, SignalGenerator,
    SyntheticInput, UnavailableSource,
};
pub use beat::{detect_beat, BeatDetector, BeatState, BeatTuning};
pub use color::{Hsl, Rgb, Rgba};
pub use config::{AppConfig, AudioConfig, ColorMode, OvalStyle, PatternMode, VerticalMovement, VisualConfig};
pub use effects::{Effect, FrequencyBars, Particle, ParticleField, Wave, WaveField};
pub use error::{AudioUnavailable, BeatVizError, Result};
pub use patterns::{render_pattern, FrameInput};
pub use preset::PresetLibrary;
pub use render::{Dimensions, DrawCommand, DrawList, PixelCanvas, Surface};
pub use render_loop::{ControlCommand, ControlSender, FrameReport, LoopState, RenderLoop};
pub use store::{PersistedState, SettingsStore};
pub use timeline::FrameClock;
