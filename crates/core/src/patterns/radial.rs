//! Spokes from the canvas centre, one per sampled bin.

use std::f32::consts::TAU;

use super::FrameInput;
use crate::{
    config::VisualConfig,
    render::{bin_level, sensitivity_gain, Point, Stroke, Surface},
};

/// Draws `line_count` spokes at equal angular spacing. Spoke `i` reads bin
/// `2 * i` and reaches at most half the canvas height at neutral sensitivity.
pub fn render<S: Surface + ?Sized>(surface: &mut S, input: &FrameInput<'_>, config: &VisualConfig) {
    let center = input.dimensions.center();
    let stroke = Stroke::new(config.color.opaque(), config.line_thickness);
    let reach = input.dimensions.height / 2.0
        * sensitivity_gain(config.sensitivity)
        * input.beat_scale(config.beat_intensity);
    let count = config.line_count;

    for i in 0..count {
        let angle = i as f32 / count as f32 * TAU;
        let length = bin_level(input.bins, i as usize * 2) * reach;
        let end = Point::new(center.x + angle.cos() * length, center.y + angle.sin() * length);
        surface.stroke_line(center, end, stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Dimensions, DrawList};

    fn config(line_count: u32) -> VisualConfig {
        VisualConfig {
            line_count,
            ..VisualConfig::default()
        }
    }

    fn length(from: &Point, to: &Point) -> f32 {
        ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt()
    }

    #[test]
    fn draws_one_segment_per_line() {
        let bins = [200_u8; 1024];
        let input = FrameInput::new(Dimensions::new(640.0, 480.0), &bins, false, 0.0);
        for count in [1, 8, 16] {
            let mut list = DrawList::new();
            render(&mut list, &input, &config(count));
            assert_eq!(list.lines().count(), count as usize);
            assert_eq!(list.len(), count as usize);
        }
    }

    #[test]
    fn silent_frame_gives_zero_length_spokes() {
        let bins = [0_u8; 1024];
        let input = FrameInput::new(Dimensions::new(640.0, 480.0), &bins, true, 0.0);
        let mut list = DrawList::new();
        render(&mut list, &input, &config(8));

        assert_eq!(list.lines().count(), 8);
        assert!(list.lines().all(|(from, to)| length(from, to) == 0.0));
    }

    #[test]
    fn full_bin_reaches_half_height_and_beats_stretch_it() {
        let bins = [255_u8; 64];
        let dims = Dimensions::new(640.0, 480.0);
        let mut calm = DrawList::new();
        render(&mut calm, &FrameInput::new(dims, &bins, false, 0.0), &config(4));
        let mut pulse = DrawList::new();
        render(&mut pulse, &FrameInput::new(dims, &bins, true, 0.0), &config(4));

        let (from, to) = calm.lines().next().unwrap();
        assert!((length(from, to) - 240.0).abs() < 1e-3);
        let (from, to) = pulse.lines().next().unwrap();
        assert!((length(from, to) - 240.0 * 2.2).abs() < 1e-2);
    }

    #[test]
    fn samples_even_bins_only() {
        let mut bins = [0_u8; 16];
        bins[1] = 255;
        bins[3] = 255;
        let input = FrameInput::new(Dimensions::new(100.0, 100.0), &bins, false, 0.0);
        let mut list = DrawList::new();
        render(&mut list, &input, &config(4));
        assert!(list.lines().all(|(from, to)| length(from, to) == 0.0));
    }

    #[test]
    fn zero_lines_draw_nothing() {
        let bins = [255_u8; 16];
        let input = FrameInput::new(Dimensions::new(100.0, 100.0), &bins, false, 0.0);
        let mut list = DrawList::new();
        render(&mut list, &input, &config(0));
        assert!(list.is_empty());
    }
}
