use std::f32::consts::TAU;

use super::{AudioEngine, AudioSource, BandConfig, SampleProvider};
use crate::{AudioConfig, Result};

/// Partials of the kick, in Hz, paired with their amplitude.
const KICK_PARTIALS: [(f32, f32); 4] = [(80.0, 0.9), (260.0, 0.7), (480.0, 0.6), (720.0, 0.5)];
/// Envelope decay rate of the kick, per second.
const KICK_DECAY: f32 = 14.0;
const HUM_HZ: f32 = 50.0;
const HUM_LEVEL: f32 = 0.02;

/// Deterministic test signal: a decaying multi-partial kick on every beat of
/// a fixed tempo over a faint mains hum.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    sample_rate: u32,
    bpm: f32,
    position: u64,
}

impl SignalGenerator {
    pub fn new(sample_rate: u32, bpm: f32) -> Self {
        let bpm = if bpm.is_finite() && bpm > 0.0 { bpm } else { 120.0 };
        Self {
            sample_rate: sample_rate.max(1),
            bpm,
            position: 0,
        }
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Seconds between kicks.
    pub fn beat_period(&self) -> f32 {
        60.0 / self.bpm
    }

    /// Seconds of audio generated so far.
    pub fn elapsed(&self) -> f32 {
        self.position as f32 / self.sample_rate as f32
    }

    pub fn fill(&mut self, block: &mut [f32]) {
        let rate = self.sample_rate as f32;
        let period = self.beat_period();
        for sample in block.iter_mut() {
            let t = self.position as f32 / rate;
            let since_kick = t % period;
            let envelope = (-KICK_DECAY * since_kick).exp();
            let kick: f32 = KICK_PARTIALS
                .iter()
                .map(|&(hz, level)| level * (TAU * hz * since_kick).sin())
                .sum();
            *sample = envelope * kick * 0.5 + HUM_LEVEL * (TAU * HUM_HZ * t).sin();
            self.position += 1;
        }
    }

    pub fn next_block(&mut self, len: usize) -> Vec<f32> {
        let mut block = vec![0.0; len];
        self.fill(&mut block);
        block
    }
}

/// [`AudioEngine`] driven by a [`SignalGenerator`] instead of a capture
/// device. Hosts call [`SyntheticInput::pump`] once per frame.
#[derive(Debug)]
pub struct SyntheticInput {
    engine: AudioEngine,
    generator: SignalGenerator,
}

impl SyntheticInput {
    pub fn new(config: &AudioConfig, bpm: f32, bass_frequency: f32, bass_quality: f32) -> Result<Self> {
        Ok(Self {
            engine: AudioEngine::new(config, bass_frequency, bass_quality)?,
            generator: SignalGenerator::new(config.sample_rate, bpm),
        })
    }

    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }

    pub fn generator(&self) -> &SignalGenerator {
        &self.generator
    }

    /// Generates `seconds` of audio and feeds it to the engine.
    pub fn pump(&mut self, seconds: f32) -> Result<()> {
        let samples = (seconds.max(0.0) * self.engine.sample_rate() as f32).round() as usize;
        let block = self.generator.next_block(samples);
        self.engine.push_samples(&block)
    }
}

impl AudioSource for SyntheticInput {
    fn acquire(&mut self) -> Result<(Box<dyn SampleProvider>, BandConfig)> {
        self.engine.acquire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat::BeatTuning;

    #[test]
    fn generator_is_deterministic_and_periodic() {
        let mut a = SignalGenerator::new(1_000, 120.0);
        let mut b = SignalGenerator::new(1_000, 120.0);
        assert_eq!(a.next_block(700), b.next_block(700));
        assert_eq!(a.beat_period(), 0.5);
        assert!((a.elapsed() - 0.7).abs() < 1e-6);

        let fallback = SignalGenerator::new(1_000, -3.0);
        assert_eq!(fallback.bpm(), 120.0);
    }

    #[test]
    fn kicks_are_louder_than_the_gaps() {
        let config = AudioConfig::default();
        let mut input = SyntheticInput::new(&config, 120.0, 150.0, 1.0).unwrap();
        let (mut provider, band) = input.acquire().unwrap();
        let tuning = BeatTuning::default();
        let mut frame = vec![0_u8; band.bin_count];

        // First 50 ms of the first kick.
        input.pump(0.05).unwrap();
        provider.read_into(&mut frame);
        let kick = tuning.energy(&frame);

        // Read at frame rate until late in the gap so smoothing lets go of
        // the kick.
        for _ in 0..22 {
            input.pump(0.02).unwrap();
            provider.read_into(&mut frame);
        }
        let gap = tuning.energy(&frame);

        assert!(kick > gap, "kick {kick} gap {gap}");
        assert!(gap < tuning.min_energy);
    }
}
