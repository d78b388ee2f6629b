use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::write_atomic;
use crate::parser::lines::{ElementKind, ScriptLine};
use crate::parser::scenes::cue_name;

const META_EXTENSION: &str = "meta";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub description: String,
}

/// Side-file stored next to a script: the user's character and scene
/// registry plus free-form notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptMetadata {
    pub characters: Vec<CharacterEntry>,
    pub scenes: Vec<SceneEntry>,
    pub notes: String,
}

/// `roteiro.txt` → `roteiro.meta`
pub fn meta_path(script: &Path) -> PathBuf {
    script.with_extension(META_EXTENSION)
}

/// Load the side-file for `script`; a missing file is an empty registry.
pub fn load(script: &Path) -> Result<ScriptMetadata> {
    let path = meta_path(script);
    if !path.exists() {
        debug!("No metadata at {}", path.display());
        return Ok(ScriptMetadata::default());
    }
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read metadata from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse metadata from {}", path.display()))
}

/// Load only if the side-file exists.
pub fn load_existing(script: &Path) -> Result<Option<ScriptMetadata>> {
    if meta_path(script).exists() {
        load(script).map(Some)
    } else {
        Ok(None)
    }
}

pub fn save(script: &Path, meta: &ScriptMetadata) -> Result<()> {
    let path = meta_path(script);
    let json = serde_json::to_string(meta)?;
    write_atomic(&path, &json)
        .with_context(|| format!("Failed to save metadata to {}", path.display()))?;
    info!(
        "Saved {} characters, {} scenes to {}",
        meta.characters.len(),
        meta.scenes.len(),
        path.display()
    );
    Ok(())
}

impl ScriptMetadata {
    // ── Characters ──

    pub fn add_character(&mut self, name: &str, description: &str) -> Result<()> {
        let name = required(name, "character name")?;
        if self.character_index(&name).is_some() {
            bail!("A character named '{}' already exists", name);
        }
        self.characters.push(CharacterEntry {
            name,
            description: description.trim().to_string(),
        });
        Ok(())
    }

    pub fn update_character(
        &mut self,
        current: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let Some(idx) = self.character_index(current) else {
            bail!("No character named '{}'", current.trim());
        };
        if let Some(name) = name {
            let name = required(name, "character name")?;
            if matches!(self.character_index(&name), Some(other) if other != idx) {
                bail!("A character named '{}' already exists", name);
            }
            self.characters[idx].name = name;
        }
        if let Some(description) = description {
            self.characters[idx].description = description.trim().to_string();
        }
        Ok(())
    }

    pub fn remove_character(&mut self, name: &str) -> Result<CharacterEntry> {
        match self.character_index(name) {
            Some(idx) => Ok(self.characters.remove(idx)),
            None => bail!("No character named '{}'", name.trim()),
        }
    }

    fn character_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.characters
            .iter()
            .position(|c| c.name.to_lowercase() == wanted)
    }

    // ── Scenes ──

    pub fn add_scene(&mut self, entry: SceneEntry) -> Result<()> {
        let entry = clean_scene(entry)?;
        if self.scene_index(&entry.title).is_some() {
            bail!("A scene titled '{}' already exists", entry.title);
        }
        self.scenes.push(entry);
        Ok(())
    }

    /// Fields left as `None` keep their current value.
    pub fn update_scene(&mut self, current: &str, changes: SceneChanges) -> Result<()> {
        let Some(idx) = self.scene_index(current) else {
            bail!("No scene titled '{}'", current.trim());
        };
        let existing = &self.scenes[idx];
        let updated = clean_scene(SceneEntry {
            title: changes.title.unwrap_or_else(|| existing.title.clone()),
            location: changes.location.unwrap_or_else(|| existing.location.clone()),
            time: changes.time.unwrap_or_else(|| existing.time.clone()),
            description: changes
                .description
                .unwrap_or_else(|| existing.description.clone()),
        })?;
        if matches!(self.scene_index(&updated.title), Some(other) if other != idx) {
            bail!("A scene titled '{}' already exists", updated.title);
        }
        self.scenes[idx] = updated;
        Ok(())
    }

    pub fn remove_scene(&mut self, title: &str) -> Result<SceneEntry> {
        match self.scene_index(title) {
            Some(idx) => Ok(self.scenes.remove(idx)),
            None => bail!("No scene titled '{}'", title.trim()),
        }
    }

    fn scene_index(&self, title: &str) -> Option<usize> {
        let wanted = title.trim().to_lowercase();
        self.scenes
            .iter()
            .position(|s| s.title.to_lowercase() == wanted)
    }

    // ── Cross-checks against the script text ──

    /// Cues spoken in the script with no registry entry, in order of first cue.
    pub fn unregistered_cues(&self, lines: &[ScriptLine]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for line in lines.iter().filter(|l| l.kind == ElementKind::Character) {
            let name = cue_name(&line.trimmed);
            if self.character_index(&name).is_none() && !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    /// Registered characters that never get a cue in the script.
    pub fn silent_characters(&self, lines: &[ScriptLine]) -> Vec<String> {
        self.characters
            .iter()
            .filter(|c| {
                let wanted = cue_name(c.name.trim());
                !lines
                    .iter()
                    .any(|l| l.kind == ElementKind::Character && cue_name(&l.trimmed) == wanted)
            })
            .map(|c| c.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneChanges {
    pub title: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
}

fn required(value: &str, what: &str) -> Result<String> {
    let v = value.trim();
    if v.is_empty() {
        bail!("Please provide a {}", what);
    }
    Ok(v.to_string())
}

fn clean_scene(entry: SceneEntry) -> Result<SceneEntry> {
    Ok(SceneEntry {
        title: required(&entry.title, "scene title")?,
        location: entry.location.trim().to_string(),
        time: entry.time.trim().to_string(),
        description: entry.description.trim().to_string(),
    })
}
