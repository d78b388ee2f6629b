use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::parser::lines::{ElementKind, ScriptLine};
use crate::parser::scenes::cue_name;

const MIN_SCENES: usize = 3;
const MIN_CHARACTERS: usize = 2;
const MIN_DIALOGUE_LINES: usize = 3;
const MAX_SCENE_LINES: usize = 100;
const MIN_SCENE_LINES: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct CharacterStats {
    pub name: String,
    pub dialogue_lines: usize,
    pub first_line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneSpan {
    pub index: usize,
    pub heading: String,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    TooFewScenes { count: usize },
    TooFewCharacters { count: usize },
    SparseDialogue { name: String, lines: usize },
    LongScene { index: usize, heading: String, lines: usize },
    ShortScene { index: usize, heading: String, lines: usize },
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::TooFewScenes { count } => write!(
                f,
                "Only {} scene(s); consider adding more to develop the story",
                count
            ),
            Suggestion::TooFewCharacters { count } => write!(
                f,
                "Only {} character(s); consider adding more to create interaction",
                count
            ),
            Suggestion::SparseDialogue { name, lines } => write!(
                f,
                "{} has only {} line(s) of dialogue; consider developing the character",
                name, lines
            ),
            Suggestion::LongScene { index, heading, lines } => write!(
                f,
                "Scene {} ({}) runs {} lines; consider splitting it",
                index, heading, lines
            ),
            Suggestion::ShortScene { index, heading, lines } => write!(
                f,
                "Scene {} ({}) has only {} lines; consider expanding it",
                index, heading, lines
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub characters: Vec<CharacterStats>,
    pub scenes: Vec<SceneSpan>,
    pub dialogue_count: usize,
    pub action_count: usize,
    pub transition_count: usize,
    pub note_count: usize,
    pub suggestions: Vec<Suggestion>,
}

impl Analysis {
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }
}

/// Single pass over the classified stream. Transitions and notes close both
/// the current scene and the current speaker; lines after them are not
/// attributed to any scene until the next heading.
pub fn analyze(lines: &[ScriptLine]) -> Analysis {
    let mut analysis = Analysis::default();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut current_scene: Option<usize> = None;
    let mut current_character: Option<usize> = None;

    for line in lines {
        match line.kind {
            ElementKind::Transition | ElementKind::Note => {
                if line.kind == ElementKind::Transition {
                    analysis.transition_count += 1;
                } else {
                    analysis.note_count += 1;
                }
                current_scene = None;
                current_character = None;
                continue;
            }
            ElementKind::SceneHeading => {
                analysis.scenes.push(SceneSpan {
                    index: analysis.scenes.len() + 1,
                    heading: line.trimmed.clone(),
                    lines: 0,
                });
                current_scene = Some(analysis.scenes.len() - 1);
                current_character = None;
            }
            ElementKind::Character => {
                let name = cue_name(&line.trimmed);
                let idx = *by_name.entry(name.clone()).or_insert_with(|| {
                    analysis.characters.push(CharacterStats {
                        name,
                        dialogue_lines: 0,
                        first_line: line.number,
                    });
                    analysis.characters.len() - 1
                });
                current_character = Some(idx);
            }
            ElementKind::Dialogue => {
                analysis.dialogue_count += 1;
                if let Some(idx) = current_character {
                    analysis.characters[idx].dialogue_lines += 1;
                }
            }
            ElementKind::Action => analysis.action_count += 1,
            ElementKind::Blank => {}
        }

        if let Some(idx) = current_scene {
            analysis.scenes[idx].lines += 1;
        }
    }

    analysis.suggestions = suggest(&analysis);
    analysis
}

fn suggest(analysis: &Analysis) -> Vec<Suggestion> {
    let mut out = Vec::new();

    if analysis.scenes.len() < MIN_SCENES {
        out.push(Suggestion::TooFewScenes {
            count: analysis.scenes.len(),
        });
    }
    if analysis.characters.len() < MIN_CHARACTERS {
        out.push(Suggestion::TooFewCharacters {
            count: analysis.characters.len(),
        });
    }
    for c in &analysis.characters {
        if c.dialogue_lines < MIN_DIALOGUE_LINES {
            out.push(Suggestion::SparseDialogue {
                name: c.name.clone(),
                lines: c.dialogue_lines,
            });
        }
    }
    for s in &analysis.scenes {
        if s.lines > MAX_SCENE_LINES {
            out.push(Suggestion::LongScene {
                index: s.index,
                heading: s.heading.clone(),
                lines: s.lines,
            });
        } else if s.lines < MIN_SCENE_LINES {
            out.push(Suggestion::ShortScene {
                index: s.index,
                heading: s.heading.clone(),
                lines: s.lines,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormattingConfig;
    use crate::parser::lines::classify_lines;

    fn run(text: &str) -> Analysis {
        analyze(&classify_lines(text, &FormattingConfig::default()))
    }

    #[test]
    fn fixture_counts() {
        let text = std::fs::read_to_string("tests/fixtures/casa.txt").unwrap();
        let a = run(&text);
        assert_eq!(a.scene_count(), 3);
        assert_eq!(a.action_count, 4);
        assert_eq!(a.transition_count, 1);
        assert_eq!(a.note_count, 1);
        assert_eq!(a.dialogue_count, 5);

        let names: Vec<&str> = a.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["JOÃO", "MARIA", "PEDRO"]);
        assert_eq!(a.characters[0].first_line, 5);
        assert_eq!(a.characters[0].dialogue_lines, 2);
        assert_eq!(a.characters[2].dialogue_lines, 1);
    }

    #[test]
    fn note_closes_scene() {
        let text = std::fs::read_to_string("tests/fixtures/casa.txt").unwrap();
        let a = run(&text);
        // heading on line 1, note on line 13
        assert_eq!(a.scenes[0].lines, 12);
        assert_eq!(a.scenes[1].lines, 13);
        assert_eq!(a.scenes[2].lines, 3);
        assert!(a.suggestions.contains(&Suggestion::ShortScene {
            index: 3,
            heading: "CENA: DELEGACIA - DIA".into(),
            lines: 3,
        }));
    }

    #[test]
    fn few_scenes_and_characters() {
        let mut text = String::from("CENA: QUARTO - NOITE\n\nANA\nEstou aqui.\n");
        for _ in 0..10 {
            text.push_str("Ela olha pela janela.\n");
        }
        text.push_str("CENA: SALA - NOITE\n");
        let a = run(&text);
        assert_eq!(a.scene_count(), 2);
        assert_eq!(a.characters.len(), 1);
        assert!(a
            .suggestions
            .contains(&Suggestion::TooFewScenes { count: 2 }));
        assert!(a
            .suggestions
            .contains(&Suggestion::TooFewCharacters { count: 1 }));
    }

    #[test]
    fn sparse_dialogue_per_character() {
        let a = run("ANA\nOi.\nBETO\nOi.\n\nANA\nTudo bem?\n\nANA\nSim.");
        assert!(!a.suggestions.iter().any(
            |s| matches!(s, Suggestion::SparseDialogue { name, .. } if name == "ANA")
        ));
        assert!(a.suggestions.contains(&Suggestion::SparseDialogue {
            name: "BETO".into(),
            lines: 1
        }));
    }

    #[test]
    fn long_scene() {
        let mut text = String::from("CENA: DESERTO - DIA\n");
        for _ in 0..100 {
            text.push_str("Areia.\n");
        }
        let a = run(&text);
        assert_eq!(a.scenes[0].lines, 101);
        assert!(a
            .suggestions
            .iter()
            .any(|s| matches!(s, Suggestion::LongScene { index: 1, lines: 101, .. })));
    }

    #[test]
    fn repeated_titles_counted_separately() {
        let a = run("CENA: RUA - DIA\nAção.\nCENA: RUA - DIA\nAção.\nAção.");
        assert_eq!(a.scenes.len(), 2);
        assert_eq!(a.scenes[0].lines, 2);
        assert_eq!(a.scenes[1].lines, 3);
    }

    #[test]
    fn empty_script_never_fails() {
        let a = run("");
        assert_eq!(a.scene_count(), 0);
        assert!(a.suggestions.contains(&Suggestion::TooFewScenes { count: 0 }));
        assert!(a.suggestions.contains(&Suggestion::TooFewCharacters { count: 0 }));
    }
}
