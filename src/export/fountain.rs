use std::sync::LazyLock;

use regex::Regex;

use crate::config::FormattingConfig;
use crate::parser::lines::{
    classify_lines, ElementKind, ScriptLine, NOTE_MARKER, SCENE_MARKER, TRANSITION_MARKER,
};

static SCENE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(INT\./EXT|INT/EXT|I/E|INT|EXT|EST)[\. ]").unwrap());

/// Leading characters Fountain gives a meaning to.
const SPECIAL_LEADS: &[char] = &['.', '>', '!', '@', '#', '=', '~'];

pub fn export(lines: &[ScriptLine]) -> String {
    let mut out = lines
        .iter()
        .map(|l| {
            let t = l.trimmed.as_str();
            match l.kind {
                ElementKind::Blank => String::new(),
                ElementKind::SceneHeading => format!(".{}", t),
                ElementKind::Transition => format!("> {}", t),
                ElementKind::Note => format!("[[{}]]", t),
                ElementKind::Character if needs_forcing(t) => format!("@{}", t),
                ElementKind::Dialogue | ElementKind::Action if needs_forcing(t) => {
                    format!("!{}", t)
                }
                _ => t.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

/// Rewrite Fountain markup into native marker text.
pub fn to_native(fountain: &str) -> String {
    let mut out = fountain
        .lines()
        .map(|raw| native_line(raw.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    if fountain.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Strip Fountain prefixes, then classify exactly like native text.
pub fn import(fountain: &str, config: &FormattingConfig) -> Vec<ScriptLine> {
    classify_lines(&to_native(fountain), config)
}

fn native_line(t: &str) -> String {
    if let Some(inner) = t.strip_prefix("[[").and_then(|r| r.strip_suffix("]]")) {
        return with_marker(inner.trim(), NOTE_MARKER);
    }
    if let Some(rest) = t.strip_prefix('!') {
        return rest.to_string();
    }
    if let Some(rest) = t.strip_prefix('@') {
        return rest.to_string();
    }
    if t.starts_with("===") {
        return String::new();
    }
    if let Some(rest) = t.strip_prefix('.') {
        if !rest.starts_with('.') {
            return with_marker(rest.trim(), SCENE_MARKER);
        }
        return t.to_string();
    }
    if let Some(rest) = t.strip_prefix('>') {
        // ">centred<" is centred action, not a transition
        if let Some(centred) = rest.strip_suffix('<') {
            return centred.trim().to_string();
        }
        return with_marker(rest.trim(), TRANSITION_MARKER);
    }
    if t.starts_with('#') || t.starts_with('=') {
        return with_marker(t, NOTE_MARKER);
    }
    if SCENE_PREFIX_RE.is_match(t) {
        return with_marker(t, SCENE_MARKER);
    }
    t.to_string()
}

fn with_marker(text: &str, marker: &str) -> String {
    if text.starts_with(marker) {
        text.to_string()
    } else if text.is_empty() {
        marker.to_string()
    } else {
        format!("{} {}", marker, text)
    }
}

/// A pass-through line the importer would otherwise read as something else.
fn needs_forcing(t: &str) -> bool {
    t.starts_with(SPECIAL_LEADS) || t.starts_with("[[") || SCENE_PREFIX_RE.is_match(t)
}
