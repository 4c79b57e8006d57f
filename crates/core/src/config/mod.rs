use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{hsl_to_rgb, random_color, Rgb};

mod parse;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub visual: VisualConfig,
}

/// Configuration specific to the audio analysis front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioConfig {
    pub sample_rate: u32,
    /// Transform length; the analyser produces `fft_size / 2` bins.
    pub fft_size: usize,
    /// Temporal smoothing of bin magnitudes, `0` = none, `1` = frozen.
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            fft_size: 2048,
            smoothing: 0.5,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AudioConfig {
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    #[default]
    Radial,
    Horizontal,
    Oval,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Static,
    Cycle,
}

/// Group motion applied to the horizontal pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalMovement {
    #[default]
    None,
    UpDown,
    Wave,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OvalStyle {
    #[default]
    Slow,
    Wave,
    Double,
    #[serde(alias = "ovalsv2")]
    V2,
}

/// Every knob that influences how a frame is drawn.
///
/// The render loop takes a sanitised copy per frame; nothing inside the core
/// reads configuration from anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualConfig {
    pub pattern_mode: PatternMode,
    pub color: Rgb,
    pub color_mode: ColorMode,

    /// Multiplier applied to the rolling energy average to form the beat
    /// threshold.
    pub beat_sensitivity: f32,
    /// Scale applied to pattern geometry on beat frames.
    pub beat_intensity: f32,
    /// Stored with presets; the render loop does not read it.
    pub beat_decay: f32,

    /// Visual gain, `50` is neutral.
    pub sensitivity: f32,
    pub line_count: u32,
    pub line_thickness: f32,

    pub particles_enabled: bool,
    /// Upper bound on live particles.
    pub particle_count: u32,
    pub particle_size: f32,
    pub waves_enabled: bool,
    pub frequency_bars_enabled: bool,

    pub color_cycle_speed: f32,
    pub color_hue: f32,
    pub color_saturation: f32,
    pub color_lightness: f32,

    pub horizontal_line_count: u32,
    pub horizontal_line_spacing: f32,
    pub wave_amplitude: f32,
    pub wave_speed: f32,
    pub vertical_movement: VerticalMovement,
    pub vertical_speed: f32,
    pub vertical_range: f32,

    pub oval_count: u32,
    pub oval_size: f32,
    pub oval_style: OvalStyle,
    pub oval_movement_speed: f32,
    pub oval_movement_range: f32,
    /// Vertical shift in percent of half the canvas height.
    pub oval_height_offset: f32,
    pub oval_width_ratio: f32,
    pub oval_secondary_color: Rgb,
    /// Revolutions per second.
    pub oval_rotation_speed: f32,
    /// Radians.
    pub oval_rotation_offset: f32,

    /// Low-pass cutoff in Hz applied before analysis.
    pub bass_frequency: f32,
    pub bass_quality: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            pattern_mode: PatternMode::Radial,
            color: Rgb::new(0xff, 0x00, 0x00),
            color_mode: ColorMode::Static,
            beat_sensitivity: 0.12,
            beat_intensity: 2.2,
            beat_decay: 0.97,
            sensitivity: 50.0,
            line_count: 8,
            line_thickness: 2.0,
            particles_enabled: true,
            particle_count: 50,
            particle_size: 3.0,
            waves_enabled: true,
            frequency_bars_enabled: false,
            color_cycle_speed: 2.0,
            color_hue: 0.0,
            color_saturation: 100.0,
            color_lightness: 50.0,
            horizontal_line_count: 3,
            horizontal_line_spacing: 100.0,
            wave_amplitude: 50.0,
            wave_speed: 2.0,
            vertical_movement: VerticalMovement::None,
            vertical_speed: 1.0,
            vertical_range: 200.0,
            oval_count: 1,
            oval_size: 50.0,
            oval_style: OvalStyle::Slow,
            oval_movement_speed: 2.0,
            oval_movement_range: 100.0,
            oval_height_offset: 0.0,
            oval_width_ratio: 1.0,
            oval_secondary_color: Rgb::new(0x00, 0xff, 0xff),
            oval_rotation_speed: 0.2,
            oval_rotation_offset: 0.0,
            bass_frequency: 150.0,
            bass_quality: 1.0,
        }
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl VisualConfig {
    /// Returns a copy with every numeric field forced into its valid range.
    /// Non-finite numbers fall back to the default value.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            beat_sensitivity: clamp_or(self.beat_sensitivity, 0.0, 5.0, d.beat_sensitivity),
            beat_intensity: clamp_or(self.beat_intensity, 0.0, 5.0, d.beat_intensity),
            beat_decay: clamp_or(self.beat_decay, 0.0, 1.0, d.beat_decay),
            sensitivity: clamp_or(self.sensitivity, 0.0, 100.0, d.sensitivity),
            line_count: self.line_count.min(360),
            line_thickness: clamp_or(self.line_thickness, 0.1, 20.0, d.line_thickness),
            particle_count: self.particle_count.min(1000),
            particle_size: clamp_or(self.particle_size, 0.1, 50.0, d.particle_size),
            color_cycle_speed: clamp_or(self.color_cycle_speed, 0.0, 100.0, d.color_cycle_speed),
            color_hue: if self.color_hue.is_finite() {
                self.color_hue.rem_euclid(360.0)
            } else {
                d.color_hue
            },
            color_saturation: clamp_or(self.color_saturation, 0.0, 100.0, d.color_saturation),
            color_lightness: clamp_or(self.color_lightness, 0.0, 100.0, d.color_lightness),
            horizontal_line_count: self.horizontal_line_count.min(64),
            horizontal_line_spacing: clamp_or(
                self.horizontal_line_spacing,
                0.0,
                1000.0,
                d.horizontal_line_spacing,
            ),
            wave_amplitude: clamp_or(self.wave_amplitude, 0.0, 1000.0, d.wave_amplitude),
            wave_speed: clamp_or(self.wave_speed, -50.0, 50.0, d.wave_speed),
            vertical_speed: clamp_or(self.vertical_speed, 0.0, 50.0, d.vertical_speed),
            vertical_range: clamp_or(self.vertical_range, 0.0, 2000.0, d.vertical_range),
            oval_count: self.oval_count.clamp(1, 8),
            oval_size: clamp_or(self.oval_size, 1.0, 1000.0, d.oval_size),
            oval_movement_speed: clamp_or(self.oval_movement_speed, 0.0, 50.0, d.oval_movement_speed),
            oval_movement_range: clamp_or(
                self.oval_movement_range,
                0.0,
                2000.0,
                d.oval_movement_range,
            ),
            oval_height_offset: clamp_or(self.oval_height_offset, -100.0, 100.0, d.oval_height_offset),
            oval_width_ratio: clamp_or(self.oval_width_ratio, 0.1, 10.0, d.oval_width_ratio),
            oval_rotation_speed: clamp_or(self.oval_rotation_speed, -10.0, 10.0, d.oval_rotation_speed),
            oval_rotation_offset: if self.oval_rotation_offset.is_finite() {
                self.oval_rotation_offset
            } else {
                d.oval_rotation_offset
            },
            bass_frequency: clamp_or(self.bass_frequency, 20.0, 2000.0, d.bass_frequency),
            bass_quality: clamp_or(self.bass_quality, 0.1, 30.0, d.bass_quality),
            ..self.clone()
        }
    }

    /// Colour derived from the hue/saturation/lightness fields.
    pub fn hsl_color(&self) -> Rgb {
        hsl_to_rgb(self.color_hue, self.color_saturation, self.color_lightness)
    }

    /// A random but always usable configuration, drawn from the same ranges
    /// as the settings panel sliders.
    pub fn randomized<R: Rng>(rng: &mut R) -> Self {
        let hsl = random_color(rng);
        Self {
            pattern_mode: if rng.random_bool(0.5) {
                PatternMode::Radial
            } else {
                PatternMode::Horizontal
            },
            color_mode: if rng.random_bool(0.5) {
                ColorMode::Static
            } else {
                ColorMode::Cycle
            },
            color_hue: hsl.h,
            color_saturation: hsl.s,
            color_lightness: hsl.l,
            color: hsl_to_rgb(hsl.h, hsl.s, hsl.l),
            color_cycle_speed: rng.random_range(0.5..5.0),
            line_count: rng.random_range(3..16),
            line_thickness: rng.random_range(1..5) as f32,
            sensitivity: rng.random_range(30..70) as f32,
            particles_enabled: rng.random_bool(0.6),
            particle_size: rng.random_range(2..6) as f32,
            waves_enabled: rng.random_bool(0.6),
            frequency_bars_enabled: rng.random_bool(0.3),
            beat_sensitivity: rng.random_range(0.2..0.4),
            beat_intensity: rng.random_range(1.2..2.5),
            beat_decay: rng.random_range(0.95..0.99),
            horizontal_line_count: rng.random_range(2..8),
            horizontal_line_spacing: rng.random_range(50..150) as f32,
            wave_amplitude: rng.random_range(30..100) as f32,
            wave_speed: rng.random_range(1.0..4.0),
            vertical_movement: if rng.random_bool(0.7) {
                VerticalMovement::UpDown
            } else {
                VerticalMovement::None
            },
            vertical_speed: rng.random_range(0.5..3.0),
            vertical_range: rng.random_range(100..300) as f32,
            bass_frequency: rng.random_range(100..200) as f32,
            bass_quality: rng.random_range(0.5..2.0),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn defaults_are_already_sane() {
        let config = VisualConfig::default();
        assert_eq!(config.sanitized(), config);
        assert_eq!(config.pattern_mode, PatternMode::Radial);
        assert_eq!(config.color.to_string(), "#ff0000");
    }

    #[test]
    fn sanitizing_clamps_and_repairs() {
        let config = VisualConfig {
            sensitivity: 900.0,
            beat_intensity: f32::NAN,
            oval_count: 0,
            color_hue: -30.0,
            line_count: 100_000,
            ..VisualConfig::default()
        }
        .sanitized();

        assert_eq!(config.sensitivity, 100.0);
        assert_eq!(config.beat_intensity, 2.2);
        assert_eq!(config.oval_count, 1);
        assert_eq!(config.color_hue, 330.0);
        assert_eq!(config.line_count, 360);
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let json = serde_json::to_value(VisualConfig::default()).unwrap();
        assert_eq!(json["patternMode"], "radial");
        assert_eq!(json["horizontalLineCount"], 3);
        assert_eq!(json["verticalMovement"], "none");
        assert_eq!(json["ovalSecondaryColor"], "#00ffff");
    }

    #[test]
    fn partial_snapshots_merge_over_defaults() {
        let config: VisualConfig =
            serde_json::from_str(r#"{"lineCount": 12, "ovalStyle": "ovalsv2"}"#).unwrap();
        assert_eq!(config.line_count, 12);
        assert_eq!(config.oval_style, OvalStyle::V2);
        assert_eq!(config.wave_amplitude, 50.0);
    }

    #[test]
    fn app_config_fills_missing_sections() {
        let config: AppConfig =
            serde_json::from_str(r#"{"audio": {"fftSize": 1024}, "visual": {"patternMode": "oval"}}"#)
                .unwrap();
        assert_eq!(config.audio.bin_count(), 512);
        assert_eq!(config.audio.sample_rate, 48_000);
        assert_eq!(config.visual.pattern_mode, PatternMode::Oval);
    }

    #[test]
    fn randomized_configs_are_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let config = VisualConfig::randomized(&mut rng);
            assert_eq!(config.sanitized(), config);
            assert!((3..16).contains(&config.line_count));
            assert_ne!(config.pattern_mode, PatternMode::Oval);
        }
    }

    #[test]
    fn full_round_trip_preserves_every_field() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = VisualConfig {
            oval_style: OvalStyle::Double,
            vertical_movement: VerticalMovement::Down,
            ..VisualConfig::randomized(&mut rng)
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: VisualConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
