pub mod fountain;
pub mod html;
pub mod pdf;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::FormattingConfig;
use crate::document::{load_script, title_for, write_atomic};
use crate::parser::lines::classify_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Html,
    Fountain,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Fountain => "fountain",
            ExportFormat::Pdf => "pdf",
        }
    }
}

pub struct BatchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: Vec<(PathBuf, anyhow::Error)>,
}

/// Where an export of `input` lands: next to it, or in `out_dir`.
pub fn output_path(input: &Path, format: ExportFormat, out_dir: Option<&Path>) -> PathBuf {
    let renamed = input.with_extension(format.extension());
    match (out_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}

/// Classify one script and write it in `format`. The document is rendered
/// in full before anything touches the output path.
pub fn export_file(
    input: &Path,
    format: ExportFormat,
    out_dir: Option<&Path>,
    config: &FormattingConfig,
) -> Result<PathBuf> {
    let text = load_script(input)?;
    let lines = classify_lines(&text, config);
    let out = output_path(input, format, out_dir);

    match format {
        ExportFormat::Html => {
            let doc = html::render(&lines, &title_for(input), config);
            write_atomic(&out, &doc)?;
        }
        ExportFormat::Fountain => write_atomic(&out, &fountain::export(&lines))?,
        ExportFormat::Pdf => {
            let doc = html::render(&lines, &title_for(input), config);
            pdf::write_pdf(&pdf::converter(), &doc, &out)?;
        }
    }
    Ok(out)
}

/// Export many scripts in parallel. One file failing doesn't stop the rest.
pub fn export_batch(
    inputs: &[PathBuf],
    format: ExportFormat,
    out_dir: Option<&Path>,
    config: &FormattingConfig,
) -> Result<BatchStats> {
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, Result<PathBuf>)> = inputs
        .par_iter()
        .map(|input| {
            let res = export_file(input, format, out_dir, config)
                .with_context(|| format!("Export of {} failed", input.display()));
            pb.inc(1);
            (input.clone(), res)
        })
        .collect();
    pb.finish_and_clear();

    let mut stats = BatchStats {
        total: inputs.len(),
        ok: 0,
        errors: Vec::new(),
    };
    for (input, res) in results {
        match res {
            Ok(out) => {
                info!("{} -> {}", input.display(), out.display());
                stats.ok += 1;
            }
            Err(e) => {
                warn!("{:#}", e);
                stats.errors.push((input, e));
            }
        }
    }
    Ok(stats)
}
