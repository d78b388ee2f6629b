use std::collections::HashSet;

use serde::Serialize;

use crate::metadata::ScriptMetadata;
use crate::parser::lines::{ElementKind, ScriptLine};
use crate::parser::scenes::cue_name;

const LINES_PER_PAGE: usize = 55;

#[derive(Debug, Clone, Serialize)]
pub struct ScriptStats {
    pub words: usize,
    pub chars: usize,
    pub lines: usize,
    pub pages: usize,
    pub scenes: usize,
    pub characters: usize,
    pub registered_characters: Option<usize>,
    pub registered_scenes: Option<usize>,
}

pub fn compute(text: &str, lines: &[ScriptLine], meta: Option<&ScriptMetadata>) -> ScriptStats {
    let line_count = lines.len();
    let scenes = lines
        .iter()
        .filter(|l| l.kind == ElementKind::SceneHeading)
        .count();
    let characters: HashSet<String> = lines
        .iter()
        .filter(|l| l.kind == ElementKind::Character)
        .map(|l| cue_name(&l.trimmed))
        .collect();

    ScriptStats {
        words: text.split_whitespace().count(),
        chars: text.chars().count(),
        lines: line_count,
        pages: (line_count / LINES_PER_PAGE).max(1),
        scenes,
        characters: characters.len(),
        registered_characters: meta.map(|m| m.characters.len()),
        registered_scenes: meta.map(|m| m.scenes.len()),
    }
}

pub fn print(stats: &ScriptStats) {
    println!("Words:       {}", stats.words);
    println!("Characters:  {}", stats.chars);
    println!("Lines:       {}", stats.lines);
    println!("Pages (est): {}", stats.pages);
    println!("Scenes:      {}", stats.scenes);
    println!("Speakers:    {}", stats.characters);
    if let Some(n) = stats.registered_characters {
        println!("Registered characters: {}", n);
    }
    if let Some(n) = stats.registered_scenes {
        println!("Registered scenes:     {}", n);
    }
}
