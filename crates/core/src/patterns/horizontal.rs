//! Stacked wavy lines across the full canvas width.

use std::f32::consts::{FRAC_PI_4, PI};

use super::FrameInput;
use crate::{
    config::{VerticalMovement, VisualConfig},
    render::{bin_level, sensitivity_gain, Point, Stroke, Surface},
};

/// Horizontal distance between polyline vertices.
pub const X_STEP: f32 = 2.0;
/// Upper bound on vertices per line; wider canvases get a coarser step.
pub const MAX_VERTICES: usize = 8192;
/// Number of low bins spread across the width.
pub const SPECTRUM_WINDOW: usize = 32;
/// Scroll rate of the `up`/`down` movements, in pixels per second at speed 1.
const SCROLL_RATE: f32 = 50.0;

/// Vertical displacement of line `line` for the configured group motion.
pub fn vertical_offset(config: &VisualConfig, time: f32, line: u32) -> f32 {
    let range = config.vertical_range;
    let phase = time * config.vertical_speed;

    match config.vertical_movement {
        VerticalMovement::None => 0.0,
        VerticalMovement::UpDown => phase.sin() * range,
        VerticalMovement::Wave => (phase + line as f32 * FRAC_PI_4).sin() * range * 0.5,
        VerticalMovement::Up | VerticalMovement::Down => {
            if range <= 0.0 {
                return 0.0;
            }
            let travelled = (phase * SCROLL_RATE).rem_euclid(range) - range / 2.0;
            if config.vertical_movement == VerticalMovement::Up {
                -travelled
            } else {
                travelled
            }
        }
    }
}

/// Draws `horizontal_line_count` polylines centred vertically and spaced by
/// `horizontal_line_spacing`.
pub fn render<S: Surface + ?Sized>(surface: &mut S, input: &FrameInput<'_>, config: &VisualConfig) {
    let width = input.dimensions.width;
    if !width.is_finite() || width <= 0.0 {
        return;
    }

    let stroke = Stroke::new(config.color.opaque(), config.line_thickness);
    let count = config.horizontal_line_count;
    let center_y = input.dimensions.height / 2.0;
    let amplitude = config.wave_amplitude * input.beat_scale(config.beat_intensity);
    let gain = sensitivity_gain(config.sensitivity);
    let wave_phase = input.time * config.wave_speed;
    let x_step = X_STEP.max(width / MAX_VERTICES as f32);
    let steps = ((width / x_step).ceil() as usize).min(MAX_VERTICES);
    let mut points = Vec::with_capacity(steps);

    for line in 0..count {
        let spread = (line as f32 - (count as f32 - 1.0) / 2.0) * config.horizontal_line_spacing;
        let base_y = center_y + spread + vertical_offset(config, input.time, line);

        points.clear();
        points.extend((0..steps).map(|step| {
            let x = step as f32 * x_step;
            let bin = ((x / width) * SPECTRUM_WINDOW as f32) as usize;
            let level = bin_level(input.bins, bin);
            let wave = (x / 50.0 + wave_phase + line as f32 * PI).sin() * amplitude;
            Point::new(x, base_y + wave * level * gain)
        }));

        surface.stroke_polyline(&points, stroke);
    }
}
