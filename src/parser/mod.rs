pub mod format;
pub mod lines;
pub mod scenes;

use crate::config::FormattingConfig;
use lines::ScriptLine;
use scenes::Scene;

pub struct ParsedScript {
    pub lines: Vec<ScriptLine>,
    pub scenes: Vec<Scene>,
}

/// Two-pass pipeline: text → classified lines → scenes.
pub fn parse_script(text: &str, config: &FormattingConfig) -> ParsedScript {
    let lines = lines::classify_lines(text, config);
    let scenes = scenes::cluster_scenes(&lines);
    ParsedScript { lines, scenes }
}
