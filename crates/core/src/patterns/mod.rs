//! Mutually exclusive geometric patterns. Exactly one runs per frame,
//! selected by [`VisualConfig::pattern_mode`].

pub mod horizontal;
pub mod oval;
pub mod radial;

use crate::{
    config::{PatternMode, VisualConfig},
    render::{Dimensions, Surface},
};

/// Everything a pattern or effect may read about the current frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub dimensions: Dimensions,
    /// Byte magnitudes, lowest frequency first.
    pub bins: &'a [u8],
    pub beat: bool,
    /// Seconds since the render loop started.
    pub time: f32,
}

impl<'a> FrameInput<'a> {
    pub fn new(dimensions: Dimensions, bins: &'a [u8], beat: bool, time: f32) -> Self {
        Self {
            dimensions,
            bins,
            beat,
            time,
        }
    }

    /// `factor` on beat frames, `1.0` otherwise.
    pub fn beat_scale(&self, factor: f32) -> f32 {
        if self.beat {
            factor
        } else {
            1.0
        }
    }
}

/// Draws the pattern selected by `config`.
pub fn render_pattern<S: Surface + ?Sized>(
    surface: &mut S,
    input: &FrameInput<'_>,
    config: &VisualConfig,
) {
    match config.pattern_mode {
        PatternMode::Radial => radial::render(surface, input, config),
        PatternMode::Horizontal => horizontal::render(surface, input, config),
        PatternMode::Oval => oval::render(surface, input, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList};

    #[test]
    fn dispatches_on_pattern_mode() {
        let bins = [128_u8; 1024];
        let input = FrameInput::new(Dimensions::new(800.0, 600.0), &bins, false, 1.0);

        let mut list = DrawList::new();
        render_pattern(&mut list, &input, &VisualConfig::default());
        assert!(list.commands().iter().all(|c| matches!(c, DrawCommand::Line { .. })));

        for (mode, expect_polyline) in [(PatternMode::Horizontal, true), (PatternMode::Oval, false)] {
            let config = VisualConfig {
                pattern_mode: mode,
                ..VisualConfig::default()
            };
            let mut list = DrawList::new();
            render_pattern(&mut list, &input, &config);
            assert_eq!(list.polylines().count() > 0, expect_polyline);
            assert_eq!(list.ellipses().count() > 0, !expect_polyline);
        }
    }
}
