use super::Effect;
use crate::{
    config::VisualConfig,
    patterns::FrameInput,
    render::{bin_level, Rect, Surface},
};

/// Number of bars, one per low bin.
pub const BAR_COUNT: usize = 64;
/// Gap between bars, in pixels.
pub const BAR_GAP: f32 = 2.0;

/// Spectrum bars along the bottom edge. Stateless: every frame is drawn from
/// the current bins alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrequencyBars;

impl Effect for FrequencyBars {
    fn name(&self) -> &'static str {
        "frequency-bars"
    }

    fn enabled(&self, config: &VisualConfig) -> bool {
        config.frequency_bars_enabled
    }

    fn advance_and_render(
        &mut self,
        surface: &mut dyn Surface,
        input: &FrameInput<'_>,
        config: &VisualConfig,
    ) {
        let dims = input.dimensions;
        let bar_width = ((dims.width - BAR_GAP * (BAR_COUNT - 1) as f32) / BAR_COUNT as f32).max(0.0);
        let max_height = dims.height / 3.0;
        let color = config.color.opaque();

        for i in 0..BAR_COUNT {
            let height = bin_level(input.bins, i) * max_height;
            let x = i as f32 * (bar_width + BAR_GAP);
            surface.fill_rect(Rect::new(x, dims.height - height, bar_width, height), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Dimensions, DrawList};

    #[test]
    fn draws_sixty_four_bars_from_the_lowest_bins() {
        let mut bins = vec![0_u8; 1024];
        bins[0] = 255;
        bins[63] = 51;
        bins[64] = 255;
        let input = FrameInput::new(Dimensions::new(766.0, 300.0), &bins, false, 0.0);
        let mut surface = DrawList::new();
        FrequencyBars.advance_and_render(&mut surface, &input, &VisualConfig::default());

        let rects: Vec<Rect> = surface.rects().map(|(rect, _)| *rect).collect();
        assert_eq!(rects.len(), BAR_COUNT);
        assert_eq!(rects[0], Rect::new(0.0, 200.0, 10.0, 100.0));
        assert!((rects[63].height - 20.0).abs() < 1e-4);
        assert_eq!(rects[63].x, 63.0 * 12.0);
        assert!(rects[1..63].iter().all(|rect| rect.height == 0.0));
        assert!(rects.iter().all(|rect| rect.x + rect.width <= 766.0));
    }

    #[test]
    fn narrow_canvas_degrades_to_zero_width() {
        let bins = [255_u8; 64];
        let input = FrameInput::new(Dimensions::new(50.0, 90.0), &bins, true, 0.0);
        let mut surface = DrawList::new();
        FrequencyBars.advance_and_render(&mut surface, &input, &VisualConfig::default());
        assert!(surface.rects().all(|(rect, _)| rect.width == 0.0));
    }
}
