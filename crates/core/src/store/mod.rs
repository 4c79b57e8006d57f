//! JSON persistence of the live settings and user presets.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{preset::PresetLibrary, Result, VisualConfig};

/// File name used when the host does not pick one.
pub const DEFAULT_SETTINGS_FILE: &str = "beat-visualiser.json";

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub settings: VisualConfig,
    pub presets: BTreeMap<String, VisualConfig>,
}

impl PersistedState {
    /// Library holding the persisted user presets.
    pub fn library(&self) -> PresetLibrary {
        PresetLibrary::with_user_presets(self.presets.clone())
    }

    /// Replaces the persisted presets with the user presets of `library`.
    pub fn set_library(&mut self, library: &PresetLibrary) {
        self.presets = library.user_presets().clone();
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored state. A missing file yields defaults silently; an
    /// unreadable or corrupt one yields defaults with a warning.
    pub fn load(&self) -> PersistedState {
        if !self.path.exists() {
            return PersistedState::default();
        }
        match self.try_load() {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable settings");
                PersistedState::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<PersistedState> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut state: PersistedState = serde_json::from_str(&content)?;
        state.settings = state.settings.sanitized();
        Ok(state)
    }

    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::config::{OvalStyle, PatternMode, VerticalMovement};

    #[test]
    fn round_trips_every_field() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested/settings.json"));

        let settings = VisualConfig {
            pattern_mode: PatternMode::Oval,
            oval_style: OvalStyle::V2,
            vertical_movement: VerticalMovement::Down,
            line_count: 11,
            color_hue: 123.5,
            wave_speed: 1.25,
            frequency_bars_enabled: true,
            ..VisualConfig::default()
        };
        let mut state = PersistedState {
            settings,
            ..PersistedState::default()
        };
        state.presets.insert("late night".to_owned(), VisualConfig::default());

        store.save(&state).unwrap();
        assert_eq!(store.try_load().unwrap(), state);
    }

    #[test]
    fn missing_or_corrupt_files_load_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), PersistedState::default());

        std::fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(), PersistedState::default());
        assert!(store.try_load().is_err());
    }

    #[test]
    fn partial_snapshots_merge_over_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("partial.json"));
        std::fs::write(
            store.path(),
            r#"{ "settings": { "lineCount": 6, "patternMode": "horizontal" } }"#,
        )
        .unwrap();

        let state = store.load();
        assert_eq!(state.settings.line_count, 6);
        assert_eq!(state.settings.pattern_mode, PatternMode::Horizontal);
        assert_eq!(state.settings.particle_count, 50);
        assert!(state.presets.is_empty());
    }

    #[test]
    fn library_conversion_keeps_user_presets() {
        let mut library = PresetLibrary::new();
        library.save("mine", &VisualConfig::default()).unwrap();

        let mut state = PersistedState::default();
        state.set_library(&library);
        assert_eq!(state.library(), library);
    }
}
