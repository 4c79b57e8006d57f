use rand::rngs::StdRng;

use super::{fraction_left, Effect, LIFESPAN_FRAMES};
use crate::{
    config::VisualConfig,
    patterns::FrameInput,
    render::{Dimensions, Stroke, Surface},
};

/// Radius growth per frame, in pixels.
pub const GROWTH_PER_FRAME: f32 = 5.0;

/// Expanding ring centred on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub radius: f32,
    remaining: u16,
}

impl Default for Wave {
    fn default() -> Self {
        Self {
            radius: 0.0,
            remaining: LIFESPAN_FRAMES,
        }
    }
}

impl Wave {
    pub fn opacity(&self) -> f32 {
        fraction_left(self.remaining)
    }
}

/// The ring released by one beat, or `None` when waves are disabled.
pub fn spawn_wave(config: &VisualConfig) -> Option<Wave> {
    config.waves_enabled.then(Wave::default)
}

/// Grows and fades every ring, strokes the survivors and returns them.
pub fn advance_waves<S: Surface + ?Sized>(
    surface: &mut S,
    mut waves: Vec<Wave>,
    dimensions: Dimensions,
    config: &VisualConfig,
) -> Vec<Wave> {
    let center = dimensions.center();
    waves.retain_mut(|wave| {
        wave.radius += GROWTH_PER_FRAME;
        wave.remaining = wave.remaining.saturating_sub(1);
        if wave.remaining == 0 {
            return false;
        }
        let stroke = Stroke::new(config.color.with_alpha(wave.opacity()), config.line_thickness);
        surface.stroke_circle(center, wave.radius, stroke);
        true
    });
    waves
}

#[derive(Debug, Default, Clone)]
pub struct WaveField {
    waves: Vec<Wave>,
}

impl WaveField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }
}

impl Effect for WaveField {
    fn name(&self) -> &'static str {
        "waves"
    }

    fn enabled(&self, config: &VisualConfig) -> bool {
        config.waves_enabled
    }

    fn on_beat(&mut self, _dimensions: Dimensions, config: &VisualConfig, _rng: &mut StdRng) {
        self.waves.extend(spawn_wave(config));
    }

    fn advance_and_render(
        &mut self,
        surface: &mut dyn Surface,
        input: &FrameInput<'_>,
        config: &VisualConfig,
    ) {
        let live = std::mem::take(&mut self.waves);
        self.waves = advance_waves(surface, live, input.dimensions, config);
    }

    fn live(&self) -> usize {
        self.waves.len()
    }

    fn clear(&mut self) {
        self.waves.clear();
    }
}
