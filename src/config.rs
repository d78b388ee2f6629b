//! Settings file and the column layout derived from it.
//!
//! Settings path resolution order:
//! 1. ROTEIRISTA_SETTINGS environment variable (if set)
//! 2. ~/.roteirista_pro_settings.json (default)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SETTINGS_FILE: &str = ".roteirista_pro_settings.json";

/// Widest layout column accepted from settings or flags.
pub const MAX_WIDTH: usize = 1000;

/// Column widths used by the classifier and formatter. Built once per run
/// and handed to every pass by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingConfig {
    pub page_width: usize,
    pub character_width: usize,
    pub dialogue_indent: usize,
    pub action_indent: usize,
}

impl FormattingConfig {
    /// Transitions are right-aligned against the full page.
    pub fn transition_width(&self) -> usize {
        self.page_width
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            page_width: 80,
            character_width: 40,
            dialogue_indent: 15,
            action_indent: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auto_save: bool,
    /// Minutes between auto-saves in the editor.
    pub auto_save_interval: u32,
    pub last_dir: String,
    pub theme: String,
    pub font_size: u32,
    pub font_family: String,
    pub show_line_numbers: bool,
    pub word_wrap: bool,
    pub page_width: usize,
    pub character_width: usize,
    pub dialogue_indent: usize,
    pub action_indent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let layout = FormattingConfig::default();
        Self {
            auto_save: true,
            auto_save_interval: 5,
            last_dir: dirs::home_dir()
                .map(|h| h.display().to_string())
                .unwrap_or_default(),
            theme: "dark".to_string(),
            font_size: 12,
            font_family: "Courier".to_string(),
            show_line_numbers: true,
            word_wrap: true,
            page_width: layout.page_width,
            character_width: layout.character_width,
            dialogue_indent: layout.dialogue_indent,
            action_indent: layout.action_indent,
        }
    }
}

impl Settings {
    /// Loads settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_path()?)
    }

    /// Loads settings from a specific path. Returns defaults if the file
    /// doesn't exist; keys missing from the file keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like `load_from`, but a file that can't be read or parsed falls back
    /// to defaults with a warning, so it can be overwritten.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("{:#}; starting from default settings", e);
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::document::write_atomic(path, &json)
            .with_context(|| format!("Failed to save settings to {}", path.display()))
    }

    /// Sets one key from its string form. The value is parsed as JSON first
    /// (numbers, booleans) and falls back to a plain string.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut value = serde_json::to_value(&*self)?;
        let obj = value
            .as_object_mut()
            .context("settings did not serialize to an object")?;
        if !obj.contains_key(key) {
            bail!("Unknown setting '{}'", key);
        }
        let parsed = serde_json::from_str::<serde_json::Value>(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        obj.insert(key.to_string(), parsed);

        let updated: Settings = serde_json::from_value(value)
            .with_context(|| format!("Invalid value '{}' for setting '{}'", raw, key))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn formatting(&self) -> FormattingConfig {
        FormattingConfig {
            page_width: self.page_width,
            character_width: self.character_width,
            dialogue_indent: self.dialogue_indent,
            action_indent: self.action_indent,
        }
    }

    fn validate(&self) -> Result<()> {
        check_width("page_width", self.page_width, 1)?;
        check_width("character_width", self.character_width, 1)?;
        check_width("dialogue_indent", self.dialogue_indent, 0)?;
        check_width("action_indent", self.action_indent, 0)?;
        Ok(())
    }
}

/// Layout columns must lie in `min..=MAX_WIDTH`.
pub fn check_width(name: &str, value: usize, min: usize) -> Result<()> {
    if value < min {
        bail!("{} must be at least {}", name, min);
    }
    if value > MAX_WIDTH {
        bail!("{} must be at most {}", name, MAX_WIDTH);
    }
    Ok(())
}

/// Returns the settings file path.
pub fn settings_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("ROTEIRISTA_SETTINGS") {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|h| h.join(SETTINGS_FILE))
        .context("Could not determine home directory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let s = Settings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(s.formatting(), FormattingConfig::default());
        assert_eq!(s.theme, "dark");
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"theme":"light","page_width":60,"unknown_key":1}"#).unwrap();
        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.theme, "light");
        assert_eq!(s.page_width, 60);
        assert_eq!(s.character_width, 40);
        assert!(s.auto_save);
    }

    #[test]
    fn set_parses_numbers_and_strings() {
        let mut s = Settings::default();
        s.set("page_width", "72").unwrap();
        s.set("theme", "light").unwrap();
        s.set("word_wrap", "false").unwrap();
        assert_eq!(s.page_width, 72);
        assert_eq!(s.theme, "light");
        assert!(!s.word_wrap);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut s = Settings::default();
        assert!(s.set("colour", "red").is_err());
        assert!(s.set("page_width", "wide").is_err());
        assert!(s.set("page_width", "0").is_err());
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn set_rejects_huge_widths() {
        let mut s = Settings::default();
        assert!(s.set("page_width", "1000000000000").is_err());
        assert!(s.set("dialogue_indent", "1001").is_err());
        assert_eq!(s, Settings::default());
        s.set("action_indent", "1000").unwrap();
        s.set("action_indent", "0").unwrap();
        assert_eq!(s.action_indent, 0);
    }

    #[test]
    fn oversized_file_value_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"page_width":5000}"#).unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("at most"));
    }

    #[test]
    fn malformed_file_falls_back_for_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_err());

        let mut s = Settings::load_or_default(&path);
        assert_eq!(s, Settings::default());
        s.set("theme", "light").unwrap();
        s.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().theme, "light");
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut s = Settings::default();
        s.set("dialogue_indent", "12").unwrap();
        s.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().dialogue_indent, 12);
    }
}
