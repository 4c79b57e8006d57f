//! Named configuration snapshots.
//!
//! Built-in presets are fixed looks layered over [`VisualConfig::default`].
//! User presets are full snapshots kept alongside them and persisted by the
//! settings store.

use std::collections::BTreeMap;

use crate::{
    color::Rgb,
    config::{ColorMode, PatternMode, VerticalMovement, VisualConfig},
    BeatVizError, Result,
};

pub const DEFAULT_PRESET: &str = "default";

/// The fields a built-in look overrides.
struct Look {
    name: &'static str,
    pattern: PatternMode,
    color: Rgb,
    color_mode: ColorMode,
    beat_sensitivity: f32,
    beat_intensity: f32,
    beat_decay: f32,
    sensitivity: f32,
    line_count: u32,
    line_thickness: f32,
    particles: bool,
    waves: bool,
    bars: bool,
    cycle_speed: f32,
    saturation: f32,
    horizontal_lines: u32,
    spacing: f32,
    amplitude: f32,
    wave_speed: f32,
    vertical: VerticalMovement,
}

#[rustfmt::skip]
const LOOKS: [Look; 11] = [
    Look { name: "minimal", pattern: PatternMode::Horizontal, color: Rgb::new(0x00, 0xff, 0x00), color_mode: ColorMode::Static, beat_sensitivity: 0.2, beat_intensity: 1.2, beat_decay: 0.95, sensitivity: 30.0, line_count: 4, line_thickness: 1.0, particles: false, waves: false, bars: false, cycle_speed: 1.0, saturation: 100.0, horizontal_lines: 3, spacing: 100.0, amplitude: 30.0, wave_speed: 1.0, vertical: VerticalMovement::None },
    Look { name: "maximal", pattern: PatternMode::Radial, color: Rgb::new(0x00, 0x00, 0xff), color_mode: ColorMode::Cycle, beat_sensitivity: 0.4, beat_intensity: 2.0, beat_decay: 0.99, sensitivity: 70.0, line_count: 16, line_thickness: 3.0, particles: true, waves: true, bars: true, cycle_speed: 3.0, saturation: 100.0, horizontal_lines: 5, spacing: 80.0, amplitude: 100.0, wave_speed: 3.0, vertical: VerticalMovement::UpDown },
    Look { name: "neon", pattern: PatternMode::Radial, color: Rgb::new(0x00, 0xff, 0x99), color_mode: ColorMode::Cycle, beat_sensitivity: 0.35, beat_intensity: 1.8, beat_decay: 0.98, sensitivity: 65.0, line_count: 12, line_thickness: 2.0, particles: true, waves: true, bars: false, cycle_speed: 4.0, saturation: 100.0, horizontal_lines: 4, spacing: 90.0, amplitude: 80.0, wave_speed: 2.0, vertical: VerticalMovement::Wave },
    Look { name: "matrix", pattern: PatternMode::Horizontal, color: Rgb::new(0x00, 0xff, 0x00), color_mode: ColorMode::Static, beat_sensitivity: 0.3, beat_intensity: 1.5, beat_decay: 0.97, sensitivity: 60.0, line_count: 20, line_thickness: 1.0, particles: false, waves: false, bars: true, cycle_speed: 0.0, saturation: 100.0, horizontal_lines: 8, spacing: 60.0, amplitude: 40.0, wave_speed: 1.0, vertical: VerticalMovement::Down },
    Look { name: "sunset", pattern: PatternMode::Horizontal, color: Rgb::new(0xff, 0x6b, 0x35), color_mode: ColorMode::Cycle, beat_sensitivity: 0.25, beat_intensity: 1.4, beat_decay: 0.96, sensitivity: 55.0, line_count: 10, line_thickness: 2.0, particles: true, waves: true, bars: false, cycle_speed: 1.0, saturation: 90.0, horizontal_lines: 6, spacing: 120.0, amplitude: 90.0, wave_speed: 1.0, vertical: VerticalMovement::Wave },
    Look { name: "ocean", pattern: PatternMode::Horizontal, color: Rgb::new(0x00, 0x77, 0xbe), color_mode: ColorMode::Cycle, beat_sensitivity: 0.2, beat_intensity: 1.3, beat_decay: 0.95, sensitivity: 50.0, line_count: 8, line_thickness: 3.0, particles: false, waves: true, bars: false, cycle_speed: 2.0, saturation: 80.0, horizontal_lines: 5, spacing: 150.0, amplitude: 120.0, wave_speed: 1.5, vertical: VerticalMovement::Wave },
    Look { name: "fire", pattern: PatternMode::Radial, color: Rgb::new(0xff, 0x45, 0x00), color_mode: ColorMode::Cycle, beat_sensitivity: 0.4, beat_intensity: 2.2, beat_decay: 0.98, sensitivity: 75.0, line_count: 14, line_thickness: 2.0, particles: true, waves: true, bars: true, cycle_speed: 5.0, saturation: 100.0, horizontal_lines: 4, spacing: 70.0, amplitude: 60.0, wave_speed: 4.0, vertical: VerticalMovement::Up },
    Look { name: "rainbow", pattern: PatternMode::Radial, color: Rgb::new(0xff, 0x00, 0x00), color_mode: ColorMode::Cycle, beat_sensitivity: 0.3, beat_intensity: 1.6, beat_decay: 0.97, sensitivity: 65.0, line_count: 12, line_thickness: 2.0, particles: true, waves: true, bars: false, cycle_speed: 6.0, saturation: 100.0, horizontal_lines: 6, spacing: 100.0, amplitude: 70.0, wave_speed: 2.0, vertical: VerticalMovement::None },
    Look { name: "cosmic", pattern: PatternMode::Radial, color: Rgb::new(0x94, 0x00, 0xd3), color_mode: ColorMode::Cycle, beat_sensitivity: 0.35, beat_intensity: 1.9, beat_decay: 0.98, sensitivity: 70.0, line_count: 16, line_thickness: 2.0, particles: true, waves: true, bars: false, cycle_speed: 3.0, saturation: 90.0, horizontal_lines: 5, spacing: 110.0, amplitude: 85.0, wave_speed: 2.5, vertical: VerticalMovement::Wave },
    Look { name: "retro", pattern: PatternMode::Horizontal, color: Rgb::new(0xff, 0x00, 0xff), color_mode: ColorMode::Cycle, beat_sensitivity: 0.3, beat_intensity: 1.7, beat_decay: 0.96, sensitivity: 60.0, line_count: 10, line_thickness: 2.0, particles: false, waves: true, bars: true, cycle_speed: 4.0, saturation: 95.0, horizontal_lines: 7, spacing: 80.0, amplitude: 50.0, wave_speed: 3.0, vertical: VerticalMovement::Up },
    Look { name: "zen", pattern: PatternMode::Radial, color: Rgb::new(0x7a, 0xc5, 0xcd), color_mode: ColorMode::Static, beat_sensitivity: 0.15, beat_intensity: 1.1, beat_decay: 0.94, sensitivity: 45.0, line_count: 8, line_thickness: 1.0, particles: false, waves: true, bars: false, cycle_speed: 1.0, saturation: 70.0, horizontal_lines: 4, spacing: 140.0, amplitude: 40.0, wave_speed: 1.0, vertical: VerticalMovement::None },
];

impl Look {
    fn config(&self) -> VisualConfig {
        VisualConfig {
            pattern_mode: self.pattern,
            color: self.color,
            color_mode: self.color_mode,
            beat_sensitivity: self.beat_sensitivity,
            beat_intensity: self.beat_intensity,
            beat_decay: self.beat_decay,
            sensitivity: self.sensitivity,
            line_count: self.line_count,
            line_thickness: self.line_thickness,
            particles_enabled: self.particles,
            waves_enabled: self.waves,
            frequency_bars_enabled: self.bars,
            color_cycle_speed: self.cycle_speed,
            color_saturation: self.saturation,
            horizontal_line_count: self.horizontal_lines,
            horizontal_line_spacing: self.spacing,
            wave_amplitude: self.amplitude,
            wave_speed: self.wave_speed,
            vertical_movement: self.vertical,
            ..VisualConfig::default()
        }
    }
}

/// Names of the built-in presets, `default` first.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    std::iter::once(DEFAULT_PRESET).chain(LOOKS.iter().map(|look| look.name))
}

pub fn is_builtin(name: &str) -> bool {
    builtin_names().any(|builtin| builtin == name)
}

/// The built-in preset called `name`, if there is one.
pub fn builtin(name: &str) -> Option<VisualConfig> {
    if name == DEFAULT_PRESET {
        return Some(VisualConfig::default());
    }
    LOOKS.iter().find(|look| look.name == name).map(Look::config)
}

/// Built-in presets plus user snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetLibrary {
    user: BTreeMap<String, VisualConfig>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library seeded with previously persisted user presets. Entries that
    /// collide with a built-in name are dropped.
    pub fn with_user_presets(presets: BTreeMap<String, VisualConfig>) -> Self {
        let user = presets
            .into_iter()
            .filter(|(name, _)| {
                let keep = !is_builtin(name);
                if !keep {
                    tracing::warn!(preset = %name, "ignoring user preset that shadows a built-in");
                }
                keep
            })
            .collect();
        Self { user }
    }

    pub fn user_presets(&self) -> &BTreeMap<String, VisualConfig> {
        &self.user
    }

    pub fn get(&self, name: &str) -> Option<VisualConfig> {
        builtin(name).or_else(|| self.user.get(name).cloned())
    }

    /// Resolves `name`, failing for unknown presets.
    pub fn try_load(&self, name: &str) -> Result<VisualConfig> {
        self.get(name)
            .ok_or_else(|| BeatVizError::UnknownPreset(name.to_owned()))
    }

    /// Resolves `name`; an unknown preset yields the defaults.
    pub fn load(&self, name: &str) -> VisualConfig {
        self.get(name).unwrap_or_else(|| {
            tracing::warn!(preset = %name, "unknown preset, using defaults");
            VisualConfig::default()
        })
    }

    /// Stores a snapshot of `config` under `name`, replacing an earlier user
    /// preset of that name.
    pub fn save(&mut self, name: &str, config: &VisualConfig) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BeatVizError::InvalidInput("preset name must not be empty"));
        }
        if is_builtin(name) {
            return Err(BeatVizError::msg(format!(
                "`{name}` is a built-in preset and cannot be overwritten"
            )));
        }
        self.user.insert(name.to_owned(), config.clone());
        tracing::info!(preset = %name, "saved preset");
        Ok(())
    }

    /// Deletes a user preset. Built-ins are not stored here, so removing one
    /// yields `None` and leaves it loadable.
    pub fn remove(&mut self, name: &str) -> Option<VisualConfig> {
        let removed = self.user.remove(name.trim());
        if removed.is_some() {
            tracing::info!(preset = %name.trim(), "removed preset");
        }
        removed
    }

    /// Every preset name: built-ins first, then user presets alphabetically.
    pub fn names(&self) -> Vec<String> {
        builtin_names()
            .map(str::to_owned)
            .chain(self.user.keys().cloned())
            .collect()
    }
}
