use serde::Serialize;

use super::lines::{ElementKind, ScriptLine};

#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    /// 1-based position among the script's scenes.
    pub index: usize,
    pub heading: String,
    pub first_line: usize,
    pub last_line: usize,
    /// Distinct speaking characters, in order of first cue.
    pub characters: Vec<String>,
}

impl Scene {
    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }
}

/// Group a classified stream into scenes bounded by scene headings.
/// Anything before the first heading belongs to no scene.
pub fn cluster_scenes(lines: &[ScriptLine]) -> Vec<Scene> {
    let mut scenes: Vec<Scene> = Vec::new();
    let mut current: Option<Scene> = None;

    for line in lines {
        match line.kind {
            ElementKind::SceneHeading => {
                if let Some(done) = current.take() {
                    scenes.push(done);
                }
                current = Some(Scene {
                    index: scenes.len() + 1,
                    heading: line.trimmed.clone(),
                    first_line: line.number,
                    last_line: line.number,
                    characters: Vec::new(),
                });
            }
            kind => {
                let Some(scene) = current.as_mut() else {
                    continue;
                };
                scene.last_line = line.number;
                if kind == ElementKind::Character {
                    let name = cue_name(&line.trimmed);
                    if !scene.characters.contains(&name) {
                        scene.characters.push(name);
                    }
                }
            }
        }
    }

    if let Some(done) = current {
        scenes.push(done);
    }

    scenes
}

/// Normalised speaker name for a character cue.
pub fn cue_name(trimmed: &str) -> String {
    trimmed.to_uppercase()
}

// ── Tests ──
