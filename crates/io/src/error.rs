use std::fmt;
use std::path::Path;

use sampleaudit_recon::ReconError;

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened (missing, permissions, not a workbook).
    Open { path: String, message: String },
    /// File opened but its contents could not be read.
    Read { path: String, message: String },
    Write { path: String, message: String },
    /// Malformed delimited text.
    Csv(String),
    /// Extension not recognized as a worksheet or document format.
    Unsupported(String),
    /// External tool (e.g. `pdftotext`) not on PATH.
    ToolMissing { tool: String, hint: String },
    ToolFailed { tool: String, message: String },
    Recon(ReconError),
}

impl IoError {
    pub(crate) fn open(path: &Path, message: impl fmt::Display) -> Self {
        Self::Open { path: path.display().to_string(), message: message.to_string() }
    }

    pub(crate) fn read(path: &Path, message: impl fmt::Display) -> Self {
        Self::Read { path: path.display().to_string(), message: message.to_string() }
    }

    pub(crate) fn write(path: &Path, message: impl fmt::Display) -> Self {
        Self::Write { path: path.display().to_string(), message: message.to_string() }
    }

    /// Install hint for a missing tool, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::ToolMissing { hint, .. } => Some(hint),
            _ => None,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, message } => write!(f, "cannot open {path}: {message}"),
            Self::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Write { path, message } => write!(f, "cannot write {path}: {message}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Unsupported(msg) => write!(f, "unsupported file: {msg}"),
            Self::ToolMissing { tool, .. } => write!(f, "{tool} not installed"),
            Self::ToolFailed { tool, message } => write!(f, "{tool} failed: {message}"),
            Self::Recon(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Recon(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReconError> for IoError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
