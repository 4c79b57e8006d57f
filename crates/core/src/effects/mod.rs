//! Additive overlays drawn after the active pattern.
//!
//! Particles and waves are born on beats and fade out over a fixed number of
//! frames; frequency bars are redrawn from scratch every frame.

pub mod bars;
pub mod particles;
pub mod waves;

use rand::rngs::StdRng;

pub use bars::FrequencyBars;
pub use particles::{Particle, ParticleField};
pub use waves::{Wave, WaveField};

use crate::{
    config::VisualConfig,
    patterns::FrameInput,
    render::{Dimensions, Surface},
};

/// Per-frame decay of particle life and wave opacity.
pub const FADE_PER_FRAME: f32 = 0.02;
/// Frames from birth to removal, `1 / FADE_PER_FRAME`.
pub const LIFESPAN_FRAMES: u16 = 50;

/// Shared contract of every overlay driven by the render loop.
pub trait Effect {
    fn name(&self) -> &'static str;

    /// Whether `config` switches this overlay on.
    fn enabled(&self, config: &VisualConfig) -> bool;

    /// Called on beat frames, before [`Effect::advance_and_render`].
    fn on_beat(&mut self, _dimensions: Dimensions, _config: &VisualConfig, _rng: &mut StdRng) {}

    /// Steps live instances one frame, draws the survivors and drops the rest.
    fn advance_and_render(
        &mut self,
        surface: &mut dyn Surface,
        input: &FrameInput<'_>,
        config: &VisualConfig,
    );

    /// Number of live instances.
    fn live(&self) -> usize {
        0
    }

    /// Drops every live instance.
    fn clear(&mut self) {}
}

/// Remaining frames expressed as a `0..=1` fraction of the full lifespan.
fn fraction_left(remaining: u16) -> f32 {
    remaining as f32 / LIFESPAN_FRAMES as f32
}
