use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Worksheet has no recognizable header row or lacks a mandatory column.
    Format(String),
    /// Document yielded no text, or the text yielded no sample records.
    Extraction(String),
    /// Reconciliation invoked before both sources produced records.
    Precondition(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad pattern, threshold out of range, etc.).
    ConfigValidation(String),
}

impl ReconError {
    /// Short machine-readable kind, used in JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format(_) => "format_error",
            Self::Extraction(_) => "extraction_error",
            Self::Precondition(_) => "precondition_error",
            Self::ConfigParse(_) => "config_parse_error",
            Self::ConfigValidation(_) => "config_validation_error",
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(msg) => write!(f, "worksheet format error: {msg}"),
            Self::Extraction(msg) => write!(f, "document extraction error: {msg}"),
            Self::Precondition(msg) => write!(f, "cannot reconcile: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
