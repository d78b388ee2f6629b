use crate::config::FormattingConfig;
use crate::parser::lines::{ElementKind, ScriptLine};

const STYLE: &str = r#"
        body {
            font-family: Courier, monospace;
            font-size: 12pt;
            line-height: 1.5;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: #ffffff;
            color: #000000;
        }
        .scene {
            font-weight: bold;
            color: #0066cc;
            text-transform: uppercase;
            margin-top: 20px;
        }
        .character {
            font-weight: bold;
            color: #0066cc;
            text-align: center;
            margin-top: 20px;
        }
        .transition {
            font-weight: bold;
            color: #0066cc;
            text-align: right;
            margin-top: 20px;
        }
        .note {
            font-style: italic;
            color: #666666;
        }
        @page {
            size: A4;
            margin: 1in;
        }
        @media print {
            body { max-width: none; padding: 0; }
            .scene, .character, .transition { color: #000000; }
            .scene { page-break-after: avoid; }
            .character { page-break-after: avoid; }
        }
"#;

/// Indents follow the same layout `reformat` uses.
fn layout_style(config: &FormattingConfig) -> String {
    format!(
        "        .dialogue {{\n            margin-left: {d}ch;\n            margin-right: {d}ch;\n        }}\n        .action {{\n            margin-left: {a}ch;\n        }}\n",
        d = config.dialogue_indent,
        a = config.action_indent
    )
}

/// Full HTML document, one `<div>` per element, `<br>` per blank line.
pub fn render(lines: &[ScriptLine], title: &str, config: &FormattingConfig) -> String {
    let body = lines
        .iter()
        .map(|l| match l.kind {
            ElementKind::Blank => "<br>".to_string(),
            kind => format!(
                "<div class=\"{}\">{}</div>",
                kind.tag(),
                escape(&l.trimmed)
            ),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{}</title>\n    <style>{}{}    </style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        STYLE,
        layout_style(config),
        body
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::classify_lines;

    fn html(text: &str) -> String {
        let config = FormattingConfig::default();
        render(&classify_lines(text, &config), "Teste", &config)
    }

    #[test]
    fn one_div_per_kind() {
        let out = html("CENA: CASA - DIA\n\nJOÃO\nOla.\n\nTRANSIÇÃO: CORTE PARA:\nNOTA: ok\nEle sai.");
        assert!(out.contains("<div class=\"scene\">CENA: CASA - DIA</div>"));
        assert!(out.contains("<div class=\"character\">JOÃO</div>"));
        assert!(out.contains("<div class=\"dialogue\">Ola.</div>"));
        assert!(out.contains("<div class=\"transition\">TRANSIÇÃO: CORTE PARA:</div>"));
        assert!(out.contains("<div class=\"note\">NOTA: ok</div>"));
        assert!(out.contains("<div class=\"action\">Ele sai.</div>"));
        assert_eq!(out.matches("<br>").count(), 2);
        assert!(out.contains("<title>Teste</title>"));
    }

    #[test]
    fn text_is_escaped() {
        let out = html("Ele grita <socorro> & \"corre\"");
        assert!(out.contains("Ele grita &lt;socorro&gt; &amp; &quot;corre&quot;"));
    }

    #[test]
    fn padding_is_dropped() {
        let out = html("                                      JOÃO");
        assert!(out.contains("<div class=\"character\">JOÃO</div>"));
    }

    #[test]
    fn indents_follow_layout() {
        assert!(html("Ele sai.").contains("margin-left: 15ch;"));
        assert!(html("Ele sai.").contains("margin-left: 10ch;"));

        let config = FormattingConfig {
            dialogue_indent: 12,
            action_indent: 4,
            ..FormattingConfig::default()
        };
        let out = render(&classify_lines("Ele sai.", &config), "Teste", &config);
        assert!(out.contains("margin-left: 12ch;\n            margin-right: 12ch;"));
        assert!(out.contains(".action {\n            margin-left: 4ch;"));
        assert!(!out.contains("15ch"));
    }
}
