use std::f32::consts::TAU;

/// Lowest accepted cutoff, in Hz.
const MIN_CUTOFF: f32 = 10.0;
/// Cutoff ceiling as a fraction of the sample rate, kept below Nyquist.
const MAX_CUTOFF_RATIO: f32 = 0.45;
const MIN_Q: f32 = 0.05;

/// Second-order low-pass placed in front of the analyser so the spectrum is
/// dominated by bass content.
///
/// Coefficients follow the Audio EQ Cookbook low-pass; samples run through a
/// transposed direct form II section.
#[derive(Debug, Clone, Copy)]
pub struct BassFilter {
    sample_rate: f32,
    frequency: f32,
    quality: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    s1: f32,
    s2: f32,
}

impl BassFilter {
    pub fn new(sample_rate: u32, frequency: f32, quality: f32) -> Self {
        let mut filter = Self {
            sample_rate: sample_rate.max(1) as f32,
            frequency,
            quality,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            s1: 0.0,
            s2: 0.0,
        };
        filter.retune(frequency, quality);
        filter
    }

    /// Cutoff in Hz after clamping.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Recomputes the coefficients for a new cutoff and Q. Filter memory is
    /// kept so a live retune does not click.
    pub fn retune(&mut self, frequency: f32, quality: f32) {
        let max_cutoff = self.sample_rate * MAX_CUTOFF_RATIO;
        self.frequency = if frequency.is_finite() {
            frequency.clamp(MIN_CUTOFF, max_cutoff.max(MIN_CUTOFF))
        } else {
            max_cutoff
        };
        self.quality = if quality.is_finite() {
            quality.max(MIN_Q)
        } else {
            1.0
        };

        let omega = TAU * (self.frequency / self.sample_rate);
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * self.quality);

        let a0 = 1.0 + alpha;
        self.b0 = ((1.0 - cos_omega) / 2.0) / a0;
        self.b1 = (1.0 - cos_omega) / a0;
        self.b2 = self.b0;
        self.a1 = (-2.0 * cos_omega) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let result = self.b0 * sample + self.s1;
        self.s1 = self.b1 * sample - self.a1 * result + self.s2;
        self.s2 = self.b2 * sample - self.a2 * result;
        result
    }

    pub fn process_block(&mut self, samples: &mut [f32]) {
        for sample in samples {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(filter: &mut BassFilter, mut next: impl FnMut(usize) -> f32) -> f32 {
        let mut peak = 0.0_f32;
        for n in 0..4_800 {
            let out = filter.process(next(n));
            if n >= 4_000 {
                peak = peak.max(out.abs());
            }
        }
        peak
    }

    #[test]
    fn passes_dc_and_rejects_nyquist() {
        let mut filter = BassFilter::new(48_000, 150.0, 1.0);
        let dc = settle(&mut filter, |_| 1.0);
        assert!((dc - 1.0).abs() < 1e-3, "dc gain {dc}");

        filter.reset();
        let nyquist = settle(&mut filter, |n| if n % 2 == 0 { 1.0 } else { -1.0 });
        assert!(nyquist < 1e-3, "nyquist gain {nyquist}");
    }

    #[test]
    fn attenuates_above_cutoff() {
        let mut filter = BassFilter::new(48_000, 150.0, 0.707);
        let low = settle(&mut filter, |n| (TAU * 60.0 * n as f32 / 48_000.0).sin());
        filter.reset();
        let high = settle(&mut filter, |n| (TAU * 3_000.0 * n as f32 / 48_000.0).sin());
        assert!(low > 0.9, "low band gain {low}");
        assert!(high < 0.01, "high band gain {high}");
    }

    #[test]
    fn clamps_nonsense_parameters() {
        let filter = BassFilter::new(48_000, -5.0, 0.0);
        assert_eq!(filter.frequency(), MIN_CUTOFF);
        assert_eq!(filter.quality(), MIN_Q);

        let filter = BassFilter::new(48_000, f32::NAN, f32::INFINITY);
        assert_eq!(filter.frequency(), 48_000.0 * MAX_CUTOFF_RATIO);
        assert_eq!(filter.quality(), 1.0);
    }
}
