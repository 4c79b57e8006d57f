use std::time::Duration;

pub const DEFAULT_FPS: f32 = 60.0;

/// Fixed-step clock for hosts that render without a display refresh, so
/// that repeated runs see identical timestamps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_duration: Duration,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl FrameClock {
    pub fn new(fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { DEFAULT_FPS };
        Self {
            frame_duration: Duration::from_nanos((1e9 / f64::from(fps)).round() as u64),
            frames: 0,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Frames handed out so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Timestamp of the next frame; the first frame is at zero.
    pub fn tick(&mut self) -> Duration {
        let at = self.elapsed();
        self.frames += 1;
        at
    }

    pub fn elapsed(&self) -> Duration {
        self.frame_duration
            .saturating_mul(u32::try_from(self.frames).unwrap_or(u32::MAX))
    }

    pub fn reset(&mut self) {
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_in_fixed_steps_from_zero() {
        let mut clock = FrameClock::new(50.0);
        assert_eq!(clock.tick(), Duration::ZERO);
        assert_eq!(clock.tick(), Duration::from_millis(20));
        assert_eq!(clock.tick(), Duration::from_millis(40));
        assert_eq!(clock.frames(), 3);

        clock.reset();
        assert_eq!(clock.tick(), Duration::ZERO);
    }

    #[test]
    fn rejects_nonsense_rates() {
        assert_eq!(FrameClock::new(0.0).frame_duration(), FrameClock::default().frame_duration());
        assert_eq!(FrameClock::new(f32::NAN).frame_duration(), FrameClock::default().frame_duration());
    }
}
