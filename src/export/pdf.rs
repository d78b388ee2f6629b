use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

const DEFAULT_CONVERTER: &str = "wkhtmltopdf";

/// Converter binary, overridable with ROTEIRISTA_WKHTMLTOPDF.
pub fn converter() -> String {
    std::env::var("ROTEIRISTA_WKHTMLTOPDF").unwrap_or_else(|_| DEFAULT_CONVERTER.to_string())
}

/// Render `html` to `out` through an external HTML→PDF converter. The
/// converter writes into a temp file next to `out`, which replaces `out`
/// only once it holds a non-empty document.
pub fn write_pdf(program: &str, html: &str, out: &Path) -> Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix("roteirista-")
        .suffix(".html")
        .tempfile()
        .context("Failed to create temporary HTML file")?;
    tmp.write_all(html.as_bytes())?;
    tmp.flush()?;

    let dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let pdf = tempfile::Builder::new()
        .prefix(".roteirista-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary PDF in {}", dir.display()))?;

    debug!("Running {} {} {}", program, tmp.path().display(), pdf.path().display());
    let output = Command::new(program)
        .arg(tmp.path())
        .arg(pdf.path())
        .output()
        .with_context(|| format!("Failed to run '{}' (is it installed?)", program))?;

    if !output.status.success() {
        bail!(
            "'{}' exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    let written = std::fs::metadata(pdf.path()).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        bail!("'{}' reported success but wrote no {}", program, out.display());
    }
    pdf.persist(out)
        .with_context(|| format!("Failed to move PDF into {}", out.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_converter() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("roteiro.pdf");
        let err = write_pdf("roteirista-no-such-converter", "<html></html>", &out).unwrap_err();
        assert!(err.to_string().contains("is it installed"));
        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_converter() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("roteiro.pdf");
        assert!(write_pdf("false", "<html></html>", &out).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn converter_that_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("roteiro.pdf");
        let err = write_pdf("true", "<html></html>", &out).unwrap_err();
        assert!(err.to_string().contains("wrote no"));
    }

    #[cfg(unix)]
    #[test]
    fn stale_pdf_is_not_success() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("roteiro.pdf");
        std::fs::write(&out, "old").unwrap();
        let err = write_pdf("true", "<html></html>", &out).unwrap_err();
        assert!(err.to_string().contains("wrote no"));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn failed_conversion_keeps_previous_pdf() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("roteiro.pdf");
        std::fs::write(&out, "old").unwrap();
        assert!(write_pdf("false", "<html></html>", &out).is_err());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "old");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn converter_replaces_previous_pdf() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("roteiro.pdf");
        std::fs::write(&out, "old").unwrap();
        write_pdf("cp", "<html>new</html>", &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "<html>new</html>");
    }

    #[cfg(unix)]
    #[test]
    fn converter_receives_html_path() {
        // `cp` stands in for the converter: copies the HTML to the target.
        let dir = tempdir().unwrap();
        let out = dir.path().join("roteiro.pdf");
        write_pdf("cp", "<html>ok</html>", &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "<html>ok</html>");
    }
}
