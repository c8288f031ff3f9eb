use std::fs;
use std::path::{Path, PathBuf};

use engine::snapshot::parse_bool;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::keyboard::KeyboardLayout;
use crate::notes::Tempo;

pub const SETTINGS_PATH_VAR: &str = "RHYTHM_SETTINGS_PATH";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clamp_to_monitor: bool,
    pub vsync: Option<bool>,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "rhythm sketch".to_string(),
            width: 960,
            height: 640,
            clamp_to_monitor: true,
            vsync: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SketchSettings {
    pub window: WindowSettings,
    pub tempo: Tempo,
    pub keyboard: KeyboardLayout,
    /// Seconds of logical time before beat zero.
    pub lead_in: f64,
    pub show_debug: bool,
    pub show_keyboard: bool,
}

impl Default for SketchSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            tempo: Tempo::default(),
            keyboard: KeyboardLayout::default(),
            lead_in: 1.0,
            show_debug: true,
            show_keyboard: true,
        }
    }
}

impl SketchSettings {
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.tempo.bpm.is_finite() && self.tempo.bpm > 0.0) {
            self.tempo.bpm = defaults.tempo.bpm;
        }
        if !(self.tempo.pixels_per_second.is_finite() && self.tempo.pixels_per_second > 0.0) {
            self.tempo.pixels_per_second = defaults.tempo.pixels_per_second;
        }
        if !self.lead_in.is_finite() {
            self.lead_in = defaults.lead_in;
        }
        self.lead_in = self.lead_in.clamp(0.0, 10.0);
        self.window.width = self.window.width.clamp(64, 8192);
        self.window.height = self.window.height.clamp(64, 8192);
        let keyboard = self.keyboard.sanitized();
        if keyboard != self.keyboard {
            warn!(
                from = ?self.keyboard,
                to = ?keyboard,
                "keyboard settings out of range, clamped"
            );
        }
        self.keyboard = keyboard;
        self
    }

    /// Applies `RHYTHM_BPM`, `RHYTHM_PIXELS_PER_SECOND` and `RHYTHM_DEBUG` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(bpm) = parse_positive(lookup("RHYTHM_BPM")) {
            self.tempo.bpm = bpm;
        }
        if let Some(pps) = parse_positive(lookup("RHYTHM_PIXELS_PER_SECOND")) {
            self.tempo.pixels_per_second = pps;
        }
        if let Some(debug) = lookup("RHYTHM_DEBUG").as_deref().and_then(parse_bool) {
            self.show_debug = debug;
        }
        self
    }
}

fn parse_positive(raw: Option<String>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Where settings come from. Without a path everything is defaulted.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os(SETTINGS_PATH_VAR).map(PathBuf::from),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn try_load(&self) -> Result<SketchSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(SketchSettings::default());
        };
        let bytes = fs::read(path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = serde_json::from_slice::<SketchSettings>(&bytes).map_err(|source| {
            SettingsError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        Ok(parsed.sanitized())
    }

    /// Like `try_load`, falling back to defaults with a warning.
    pub fn load(&self) -> SketchSettings {
        match self.try_load() {
            Ok(settings) => {
                if let Some(path) = &self.path {
                    info!(path = %path.display(), "loaded settings");
                }
                settings
            }
            Err(err) => {
                warn!(error = %err, "using default settings");
                SketchSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &SketchSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source: std::io::Error| SettingsError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(settings).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(path, text).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_replace_valid_values_only() {
        let settings = SketchSettings::default().with_overrides(lookup(&[
            ("RHYTHM_BPM", "90"),
            ("RHYTHM_PIXELS_PER_SECOND", "-5"),
            ("RHYTHM_DEBUG", "off"),
        ]));
        assert_eq!(settings.tempo.bpm, 90.0);
        assert_eq!(settings.tempo.pixels_per_second, 200.0);
        assert!(!settings.show_debug);
    }

    #[test]
    fn sanitized_repairs_bad_values() {
        let settings = SketchSettings {
            tempo: Tempo::new(0.0, f64::INFINITY),
            lead_in: -4.0,
            window: WindowSettings {
                width: 1,
                ..WindowSettings::default()
            },
            ..SketchSettings::default()
        }
        .sanitized();
        assert_eq!(settings.tempo, Tempo::default());
        assert_eq!(settings.lead_in, 0.0);
        assert_eq!(settings.window.width, 64);
    }

    #[test]
    fn huge_min_octave_from_json_is_clamped() {
        let parsed: SketchSettings =
            serde_json::from_str(r#"{"keyboard":{"min_octave":2000000000}}"#)
                .expect("settings JSON should parse");
        let settings = parsed.sanitized();
        assert_eq!(settings.keyboard.min_octave, 8);
        assert!(settings.keyboard.highest_pitch() <= 127);
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: SketchSettings =
            serde_json::from_str(r#"{"tempo":{"bpm":100},"show_debug":false}"#)
                .expect("settings JSON should parse");
        assert_eq!(parsed.tempo.bpm, 100.0);
        assert_eq!(parsed.tempo.pixels_per_second, 200.0);
        assert_eq!(parsed.keyboard, KeyboardLayout::default());
        assert!(!parsed.show_debug);
    }

    #[test]
    fn store_round_trips_through_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::at(dir.path().join("nested").join("settings.json"));
        let settings = SketchSettings {
            lead_in: 2.5,
            ..SketchSettings::default()
        };
        store.save(&settings).expect("save");
        assert_eq!(store.try_load().expect("load"), settings);
    }

    #[test]
    fn broken_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write");
        let store = SettingsStore::at(&path);
        assert!(matches!(store.try_load(), Err(SettingsError::Parse { .. })));
        assert_eq!(store.load(), SketchSettings::default());

        let missing = SettingsStore::at(dir.path().join("missing.json"));
        assert!(matches!(missing.try_load(), Err(SettingsError::Io { .. })));
        assert_eq!(SettingsStore::default().load(), SketchSettings::default());
    }
}
