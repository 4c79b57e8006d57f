//! Floating ellipses whose size follows the spectrum and whose centres drift
//! along sine/cosine paths.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI, TAU};

use super::FrameInput;
use crate::{
    color::Rgb,
    config::{OvalStyle, VisualConfig},
    render::{bin_level, sensitivity_gain, Dimensions, Ellipse, Point, Stroke, Surface},
};

/// Fixed palette of the `v2` style: front and back oval of every pair.
pub const V2_FRONT: Rgb = Rgb::new(0x00, 0xce, 0xd1);
pub const V2_BACK: Rgb = Rgb::new(0x94, 0x00, 0xd3);

/// Bin stride between consecutive ovals.
const BIN_STRIDE: usize = 8;

/// Per-style motion parameters.
#[derive(Debug, Clone, Copy)]
struct Motion {
    /// Slow styles run on a quarter-speed clock; the others scale time by
    /// `oval_movement_speed`.
    slow_clock: bool,
    /// Travel as a fraction of the shorter canvas side, or `None` to use
    /// `oval_movement_range`.
    travel_fraction: Option<f32>,
    x_rate: f32,
    y_rate: f32,
    x_phase: f32,
    y_phase: f32,
    y_scale: f32,
    rotates: bool,
}

impl Motion {
    fn for_style(style: OvalStyle) -> Self {
        match style {
            OvalStyle::Slow => Self {
                slow_clock: true,
                travel_fraction: Some(0.4),
                x_rate: 0.7,
                y_rate: 0.5,
                x_phase: FRAC_PI_2,
                y_phase: FRAC_PI_3,
                y_scale: 1.0,
                rotates: true,
            },
            OvalStyle::Wave | OvalStyle::Double => Self {
                slow_clock: false,
                travel_fraction: None,
                x_rate: 1.0,
                y_rate: 1.4,
                x_phase: FRAC_PI_2,
                y_phase: FRAC_PI_2,
                y_scale: 0.7,
                rotates: true,
            },
            OvalStyle::V2 => Self {
                slow_clock: true,
                travel_fraction: Some(0.25),
                x_rate: 0.3,
                y_rate: 0.2,
                x_phase: PI,
                y_phase: FRAC_PI_2,
                y_scale: 1.0,
                rotates: false,
            },
        }
    }
}

/// Values shared by every oval drawn in one frame.
struct Scene<'a> {
    input: &'a FrameInput<'a>,
    config: &'a VisualConfig,
    style: OvalStyle,
    motion: Motion,
    clock: f32,
    travel: f32,
    base_size: f32,
    lift: f32,
}

/// One oval to place: spectrum/motion index, pair index and extra rotation.
#[derive(Debug, Clone, Copy)]
struct Instance {
    index: u32,
    pair: u32,
    color: Rgb,
    rotation_offset: f32,
}

impl Scene<'_> {
    fn size(&self, index: u32) -> (f32, f32) {
        let dims = self.input.dimensions;
        let intensity = bin_level(self.input.bins, index as usize * BIN_STRIDE)
            * sensitivity_gain(self.config.sensitivity);
        let grown = self.base_size * (1.0 + intensity * 0.5);

        let mut width = match self.style {
            OvalStyle::V2 => (grown * 10.0).min(dims.width * 0.4),
            _ => grown * self.config.oval_width_ratio,
        };
        let mut height = grown;

        let pulse = self.input.beat_scale(self.config.beat_intensity);
        width *= pulse;
        height *= pulse;
        (width, height)
    }

    fn offset(&self, oval: Instance, width: f32, height: f32) -> (f32, f32) {
        let m = self.motion;
        let index = oval.index as f32;

        if self.style != OvalStyle::V2 {
            let x = (self.clock * m.x_rate + index * m.x_phase).sin() * self.travel;
            let y = (self.clock * m.y_rate + index * m.y_phase).cos() * self.travel * m.y_scale;
            return (x, y);
        }

        let dims = self.input.dimensions;
        let safe_x = (dims.width * 0.3 - width).max(0.0);
        let safe_y = (self.travel * 0.15 - height).max(0.0);
        let top = (dims.height * 0.4).max(0.0);

        let mut x = (self.clock * m.x_rate + oval.pair as f32 * m.x_phase).sin() * safe_x;
        let mut y = (self.clock * m.y_rate + index * m.y_phase).cos() * safe_y - dims.height * 0.3;

        if oval.color == V2_BACK {
            let drift = self.clock * 0.1;
            x += (drift + index * 1.5).sin() * (width * 0.3).min(safe_x * 0.2);
            y += (drift + index * 2.7).sin() * height.min(safe_y * 0.2);
        }

        (x.clamp(-safe_x, safe_x), y.clamp(-top, 0.0))
    }

    fn rotation(&self, oval: Instance) -> f32 {
        if !self.motion.rotates {
            return 0.0;
        }
        self.input.time * self.config.oval_rotation_speed * TAU
            + TAU * oval.index as f32 / 4.0
            + oval.rotation_offset
            + self.config.oval_rotation_offset
    }

    fn draw<S: Surface + ?Sized>(&self, surface: &mut S, oval: Instance) {
        let (width, height) = self.size(oval.index);
        let (dx, dy) = self.offset(oval, width, height);
        let center = self.input.dimensions.center();

        surface.stroke_ellipse(
            Ellipse {
                center: Point::new(center.x + dx, center.y + dy + self.lift),
                radius_x: width,
                radius_y: height,
                rotation: self.rotation(oval),
            },
            Stroke::new(oval.color.opaque(), self.config.line_thickness),
        );
    }
}

/// Number of stroked ellipses one call produces for `config`.
pub fn ellipse_count(config: &VisualConfig) -> u32 {
    let count = config.oval_count.clamp(1, 8);
    match config.oval_style {
        OvalStyle::Slow | OvalStyle::Wave => count,
        OvalStyle::Double => count.div_ceil(2) * 2,
        OvalStyle::V2 => count * 2,
    }
}

/// Draws the oval pattern.
pub fn render<S: Surface + ?Sized>(surface: &mut S, input: &FrameInput<'_>, config: &VisualConfig) {
    let style = config.oval_style;
    let motion = Motion::for_style(style);
    let dims: Dimensions = input.dimensions;
    let scene = Scene {
        input,
        config,
        style,
        motion,
        clock: if motion.slow_clock {
            input.time / 4.0
        } else {
            input.time * config.oval_movement_speed
        },
        travel: motion
            .travel_fraction
            .map_or(config.oval_movement_range, |fraction| dims.min_side() * fraction),
        base_size: config.oval_size.max(1.0),
        lift: config.oval_height_offset / 100.0 * dims.height / 2.0,
    };
    let count = config.oval_count.clamp(1, 8);
    let single = |index: u32, color: Rgb, rotation_offset: f32| Instance {
        index,
        pair: index,
        color,
        rotation_offset,
    };

    match style {
        OvalStyle::Slow | OvalStyle::Wave => {
            for index in 0..count {
                scene.draw(surface, single(index, config.color, 0.0));
            }
        }
        OvalStyle::Double => {
            for index in 0..count.div_ceil(2) {
                scene.draw(surface, single(index, config.color, 0.0));
                scene.draw(surface, single(index, config.oval_secondary_color, FRAC_PI_2));
            }
        }
        OvalStyle::V2 => {
            for pair in 0..count {
                scene.draw(surface, single(pair, V2_BACK, 0.0));
                scene.draw(surface, single(pair, V2_FRONT, 0.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList};

    fn config(style: OvalStyle, count: u32) -> VisualConfig {
        VisualConfig {
            pattern_mode: crate::config::PatternMode::Oval,
            oval_style: style,
            oval_count: count,
            ..VisualConfig::default()
        }
    }

    fn draw(config: &VisualConfig, bins: &[u8], beat: bool, time: f32) -> DrawList {
        let input = FrameInput::new(Dimensions::new(1280.0, 720.0), bins, beat, time);
        let mut list = DrawList::new();
        render(&mut list, &input, config);
        list
    }

    #[test]
    fn ellipse_counts_per_style() {
        let bins = [100_u8; 128];
        for (style, count, expected) in [
            (OvalStyle::Slow, 3, 3),
            (OvalStyle::Wave, 8, 8),
            (OvalStyle::Double, 3, 4),
            (OvalStyle::V2, 2, 4),
            (OvalStyle::Slow, 0, 1),
            (OvalStyle::Wave, 40, 8),
        ] {
            let config = config(style, count);
            assert_eq!(draw(&config, &bins, false, 1.0).ellipses().count(), expected);
            assert_eq!(ellipse_count(&config) as usize, expected);
        }
    }

    #[test]
    fn beats_scale_both_radii() {
        let bins = [0_u8; 128];
        let config = config(OvalStyle::Slow, 1);
        let calm = *draw(&config, &bins, false, 0.0).ellipses().next().unwrap();
        let pulse = *draw(&config, &bins, true, 0.0).ellipses().next().unwrap();

        assert_eq!(calm.radius_x, 50.0);
        assert_eq!(calm.radius_y, 50.0);
        assert!((pulse.radius_x - 110.0).abs() < 1e-3);
        assert!((pulse.radius_y - 110.0).abs() < 1e-3);
    }

    #[test]
    fn size_follows_strided_bins() {
        let mut bins = [0_u8; 128];
        bins[8] = 255;
        let list = draw(&config(OvalStyle::Wave, 2), &bins, false, 0.0);
        let radii: Vec<f32> = list.ellipses().map(|e| e.radius_y).collect();
        assert_eq!(radii, vec![50.0, 75.0]);
    }

    #[test]
    fn rotation_includes_instance_phase_and_offset() {
        let bins = [0_u8; 128];
        let config = VisualConfig {
            oval_rotation_speed: 0.0,
            oval_rotation_offset: 0.25,
            ..config(OvalStyle::Wave, 2)
        };
        let list = draw(&config, &bins, false, 3.0);
        let rotations: Vec<f32> = list.ellipses().map(|e| e.rotation).collect();
        assert!((rotations[0] - 0.25).abs() < 1e-5);
        assert!((rotations[1] - (FRAC_PI_2 + 0.25)).abs() < 1e-5);
    }

    #[test]
    fn double_style_uses_secondary_colour_with_quarter_turn() {
        let bins = [0_u8; 128];
        let config = VisualConfig {
            oval_rotation_speed: 0.0,
            ..config(OvalStyle::Double, 2)
        };
        let list = draw(&config, &bins, false, 0.0);
        let strokes: Vec<(Ellipse, Rgb)> = list
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Ellipse { ellipse, stroke } => Some((*ellipse, stroke.color.rgb())),
                _ => None,
            })
            .collect();

        assert_eq!(strokes[0].1, config.color);
        assert_eq!(strokes[1].1, config.oval_secondary_color);
        assert!((strokes[1].0.rotation - strokes[0].0.rotation - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn v2_is_two_tone_unrotated_and_clamped() {
        let config = config(OvalStyle::V2, 8);
        let dims = Dimensions::new(1280.0, 720.0);
        let center = dims.center();

        for step in 0..200 {
            let time = step as f32 * 0.37;
            let bins = [(step * 13 % 256) as u8; 128];
            let list = draw(&config, &bins, step % 3 == 0, time);

            for command in list.commands() {
                let DrawCommand::Ellipse { ellipse, stroke } = command else {
                    panic!("unexpected command {command:?}");
                };
                let color = stroke.color.rgb();
                assert!(color == V2_FRONT || color == V2_BACK);
                assert_eq!(ellipse.rotation, 0.0);

                let safe_x = (dims.width * 0.3 - ellipse.radius_x).max(0.0);
                let dx = ellipse.center.x - center.x;
                let dy = ellipse.center.y - center.y;
                assert!(dx.abs() <= safe_x + 1e-3, "dx {dx} outside {safe_x}");
                assert!(dy <= 1e-3 && dy >= -dims.height * 0.4 - 1e-3, "dy {dy}");
            }
        }
    }

    #[test]
    fn height_offset_lifts_every_oval() {
        let bins = [0_u8; 128];
        let base = config(OvalStyle::Slow, 1);
        let lifted = VisualConfig {
            oval_height_offset: -50.0,
            ..base.clone()
        };
        let a = *draw(&base, &bins, false, 2.0).ellipses().next().unwrap();
        let b = *draw(&lifted, &bins, false, 2.0).ellipses().next().unwrap();
        assert!((a.center.y - b.center.y - 180.0).abs() < 1e-3);
    }
}
