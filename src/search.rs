use anyhow::{bail, Result};
use regex::{NoExpand, Regex};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

fn build_pattern(term: &str, opts: SearchOptions) -> Result<Regex> {
    if term.is_empty() {
        bail!("Search term must not be empty");
    }
    let mut pattern = regex::escape(term);
    if opts.whole_word {
        pattern = format!(r"\b{}\b", pattern);
    }
    if !opts.case_sensitive {
        pattern = format!("(?i){}", pattern);
    }
    Ok(Regex::new(&pattern)?)
}

pub fn find(text: &str, term: &str, opts: SearchOptions) -> Result<Vec<Match>> {
    let re = build_pattern(term, opts)?;
    let mut matches = Vec::new();
    let mut line_start = 0;

    for (i, line) in text.split('\n').enumerate() {
        for m in re.find_iter(line) {
            matches.push(Match {
                line: i + 1,
                column: line[..m.start()].chars().count() + 1,
                start: line_start + m.start(),
                end: line_start + m.end(),
            });
        }
        line_start += line.len() + 1;
    }

    Ok(matches)
}

/// Replace every occurrence. The replacement is taken literally (`$1` is
/// not expanded). Returns the new buffer and the number of replacements.
pub fn replace_all(
    text: &str,
    term: &str,
    replacement: &str,
    opts: SearchOptions,
) -> Result<(String, usize)> {
    let re = build_pattern(term, opts)?;
    let count = re.find_iter(text).count();
    if count == 0 {
        return Ok((text.to_string(), 0));
    }
    let replaced = re.replace_all(text, NoExpand(replacement)).into_owned();
    Ok((replaced, count))
}
