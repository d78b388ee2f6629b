use serde::Serialize;

use crate::config::FormattingConfig;

pub const SCENE_MARKER: &str = "CENA:";
pub const TRANSITION_MARKER: &str = "TRANSIÇÃO:";
pub const NOTE_MARKER: &str = "NOTA:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Blank,
    #[serde(rename = "scene")]
    SceneHeading,
    Character,
    Dialogue,
    Action,
    Transition,
    Note,
}

impl ElementKind {
    /// Tag used for CSS classes and CLI output.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Blank => "blank",
            ElementKind::SceneHeading => "scene",
            ElementKind::Character => "character",
            ElementKind::Dialogue => "dialogue",
            ElementKind::Action => "action",
            ElementKind::Transition => "transition",
            ElementKind::Note => "note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptLine {
    /// 1-based position in the buffer.
    pub number: usize,
    pub text: String,
    pub trimmed: String,
    pub kind: ElementKind,
}

/// Classify one trimmed line given the kind of the previous non-blank line.
/// Marker prefixes win over the upper-case cue heuristic.
pub fn classify(
    trimmed: &str,
    previous: Option<ElementKind>,
    config: &FormattingConfig,
) -> ElementKind {
    if trimmed.is_empty() {
        return ElementKind::Blank;
    }
    if trimmed.starts_with(SCENE_MARKER) {
        return ElementKind::SceneHeading;
    }
    if trimmed.starts_with(TRANSITION_MARKER) {
        return ElementKind::Transition;
    }
    if trimmed.starts_with(NOTE_MARKER) {
        return ElementKind::Note;
    }
    // Short upper-case action ("OK.", "STOP!") lands here too.
    if is_upper(trimmed) && trimmed.chars().count() < config.character_width {
        return ElementKind::Character;
    }
    if previous == Some(ElementKind::Character) {
        ElementKind::Dialogue
    } else {
        ElementKind::Action
    }
}

/// Split the buffer on `\n` and classify every line in a single fold.
pub fn classify_lines(text: &str, config: &FormattingConfig) -> Vec<ScriptLine> {
    let mut lines = Vec::new();
    let mut last_kind: Option<ElementKind> = None;

    for (i, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        let kind = classify(trimmed, last_kind, config);
        if kind != ElementKind::Blank {
            last_kind = Some(kind);
        }
        lines.push(ScriptLine {
            number: i + 1,
            text: raw.to_string(),
            trimmed: trimmed.to_string(),
            kind,
        });
    }

    lines
}

/// At least one cased character and no lower-case ones. Digits and
/// punctuation are ignored, so "123" is not upper-case but "OK." is.
pub fn is_upper(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}
