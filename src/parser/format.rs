use crate::config::FormattingConfig;

use super::lines::{classify_lines, ElementKind, ScriptLine};

/// Lay out one classified line according to screenplay column conventions.
/// Works from `trimmed`, so formatting an already formatted line is stable.
pub fn format_line(line: &ScriptLine, config: &FormattingConfig) -> String {
    let text = line.trimmed.as_str();
    match line.kind {
        ElementKind::Blank => String::new(),
        ElementKind::SceneHeading => text.to_uppercase(),
        ElementKind::Character => {
            let upper = text.to_uppercase();
            let pad = config.page_width.saturating_sub(upper.chars().count()) / 2;
            pad_left(&upper, pad)
        }
        ElementKind::Dialogue => pad_left(text, config.dialogue_indent),
        ElementKind::Action => pad_left(text, config.action_indent),
        ElementKind::Transition => {
            let pad = config.transition_width().saturating_sub(text.chars().count());
            pad_left(text, pad)
        }
        ElementKind::Note => text.to_string(),
    }
}

/// Reformat a whole buffer. The new buffer is built in full before it is
/// returned; callers swap it in only once this succeeds.
pub fn reformat(text: &str, config: &FormattingConfig) -> String {
    let lines = classify_lines(text, config);
    let mut out = lines
        .iter()
        .map(|l| format_line(l, config))
        .collect::<Vec<_>>()
        .join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn pad_left(text: &str, pad: usize) -> String {
    format!("{}{}", " ".repeat(pad), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::classify;

    fn line(trimmed: &str, kind: ElementKind) -> ScriptLine {
        ScriptLine {
            number: 1,
            text: trimmed.to_string(),
            trimmed: trimmed.to_string(),
            kind,
        }
    }

    #[test]
    fn scene_heading_unchanged() {
        let config = FormattingConfig::default();
        let l = line("CENA: CASA - DIA", ElementKind::SceneHeading);
        assert_eq!(format_line(&l, &config), "CENA: CASA - DIA");
    }

    #[test]
    fn scene_heading_upper_cased() {
        let config = FormattingConfig::default();
        let l = line("CENA: casa - dia", ElementKind::SceneHeading);
        assert_eq!(format_line(&l, &config), "CENA: CASA - DIA");
    }

    #[test]
    fn character_centered() {
        let config = FormattingConfig::default();
        let out = format_line(&line("JOÃO", ElementKind::Character), &config);
        assert_eq!(out, format!("{}JOÃO", " ".repeat(38)));
    }

    #[test]
    fn character_odd_remainder_goes_right() {
        let config = FormattingConfig::default();
        let out = format_line(&line("ANA", ElementKind::Character), &config);
        // (80 - 3) / 2 = 38
        assert_eq!(out.len() - "ANA".len(), 38);
    }

    #[test]
    fn transition_right_aligned() {
        let config = FormattingConfig::default();
        let out = format_line(&line("TRANSIÇÃO: CORTE PARA:", ElementKind::Transition), &config);
        assert_eq!(out, format!("{}TRANSIÇÃO: CORTE PARA:", " ".repeat(58)));
        assert_eq!(out.chars().count(), 80);
    }

    #[test]
    fn indents() {
        let config = FormattingConfig::default();
        assert_eq!(
            format_line(&line("Ola.", ElementKind::Dialogue), &config),
            format!("{}Ola.", " ".repeat(15))
        );
        assert_eq!(
            format_line(&line("Ele caminha.", ElementKind::Action), &config),
            format!("{}Ele caminha.", " ".repeat(10))
        );
    }

    #[test]
    fn note_and_blank() {
        let config = FormattingConfig::default();
        assert_eq!(
            format_line(&line("NOTA: revisar", ElementKind::Note), &config),
            "NOTA: revisar"
        );
        assert_eq!(format_line(&line("", ElementKind::Blank), &config), "");
    }

    #[test]
    fn over_wide_lines_get_no_padding() {
        let config = FormattingConfig {
            page_width: 10,
            ..FormattingConfig::default()
        };
        let t = "TRANSIÇÃO: FUSÃO LENTA PARA:";
        assert_eq!(format_line(&line(t, ElementKind::Transition), &config), t);
        assert_eq!(
            format_line(&line("PERSONAGEM LONGO", ElementKind::Character), &config),
            "PERSONAGEM LONGO"
        );
    }

    #[test]
    fn reclassifying_formatted_lines_keeps_kind() {
        let config = FormattingConfig::default();
        let cases = [
            ("CENA: CASA - DIA", None),
            ("JOÃO", None),
            ("Ola.", Some(ElementKind::Character)),
            ("Ele caminha.", Some(ElementKind::Action)),
            ("TRANSIÇÃO: CORTE PARA:", None),
            ("NOTA: revisar", None),
        ];
        for (text, previous) in cases {
            let kind = classify(text, previous, &config);
            let formatted = format_line(&line(text, kind), &config);
            assert_eq!(
                classify(formatted.trim(), previous, &config),
                kind,
                "kind drifted for {:?}",
                text
            );
        }
    }

    #[test]
    fn reformat_is_a_fixed_point() {
        let config = FormattingConfig::default();
        let text = std::fs::read_to_string("tests/fixtures/casa.txt").unwrap();
        let once = reformat(&text, &config);
        let twice = reformat(&once, &config);
        assert_eq!(once, twice);

        let before: Vec<_> = classify_lines(&text, &config).iter().map(|l| l.kind).collect();
        let after: Vec<_> = classify_lines(&once, &config).iter().map(|l| l.kind).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn reformat_keeps_trailing_newline() {
        let config = FormattingConfig::default();
        assert!(reformat("JOÃO\nOla.\n", &config).ends_with("Ola.\n"));
        assert!(!reformat("JOÃO\nOla.", &config).ends_with('\n'));
    }
}
