//! Plain text of a billing document.
//!
//! PDFs go through poppler's `pdftotext`; a `.txt` file is taken as text
//! that was already extracted.

use std::path::Path;
use std::process::Command;

use crate::csv::read_file_as_utf8;
use crate::error::IoError;

const PDFTOTEXT: &str = "pdftotext";

/// Full text of the document at `path`, pages joined by line breaks.
pub fn read_document_text(path: &Path) -> Result<String, IoError> {
    match extension(path).as_deref() {
        Some("pdf") => run_pdftotext(path),
        Some("txt") => read_file_as_utf8(path),
        _ => Err(IoError::Unsupported(format!(
            "{} (expected a .pdf or pre-extracted .txt invoice)",
            path.display()
        ))),
    }
}

/// Run `pdftotext -layout <file> -` and capture stdout.
fn run_pdftotext(path: &Path) -> Result<String, IoError> {
    which::which(PDFTOTEXT).map_err(|_| IoError::ToolMissing {
        tool: PDFTOTEXT.to_string(),
        hint: "Install with: apt install poppler-utils / brew install poppler".to_string(),
    })?;

    if !path.is_file() {
        return Err(IoError::open(path, "no such file"));
    }

    let output = Command::new(PDFTOTEXT)
        .arg("-layout")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| IoError::ToolFailed {
            tool: PDFTOTEXT.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IoError::ToolFailed {
            tool: PDFTOTEXT.to_string(),
            message: format!("exit {}: {}", output.status.code().unwrap_or(-1), stderr.trim()),
        });
    }

    let text = pages_to_lines(&String::from_utf8_lossy(&output.stdout));
    log::info!("{}: extracted {} bytes of text", path.display(), text.len());
    Ok(text)
}

/// Page breaks become line breaks so no sample line is glued to a footer.
fn pages_to_lines(text: &str) -> String {
    text.replace('\u{0c}', "\n")
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
