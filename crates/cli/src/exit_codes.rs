//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success / reconciliation CORRECT         |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3-9     | pipeline         | Input, extraction and config failures    |
//! | 10-19   | compare          | Reconciliation outcome (not an error)    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use sampleaudit_io::IoError;
use sampleaudit_recon::{ReconError, ReconStatus};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Pipeline (3-9)
// =============================================================================

/// File could not be opened, read or written; external tool missing.
pub const EXIT_IO: u8 = 3;

/// Worksheet has no header row or lacks a mandatory column.
pub const EXIT_FORMAT: u8 = 4;

/// Invoice yielded no text or no sample codes.
pub const EXIT_EXTRACTION: u8 = 5;

/// Reconciliation needs records on both sides.
pub const EXIT_PRECONDITION: u8 = 6;

/// Config file unparseable or invalid.
pub const EXIT_INVALID_CONFIG: u8 = 7;

// =============================================================================
// Compare outcome (10-19)
// =============================================================================

/// Every sample paired, but some secondary code or analysis differs.
pub const EXIT_PARTIAL_MATCHES: u8 = 10;

/// Unbilled samples, billed-but-unknown samples, or double billing.
pub const EXIT_MAJOR_DISCREPANCIES: u8 = 11;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Format(_) => EXIT_FORMAT,
        ReconError::Extraction(_) => EXIT_EXTRACTION,
        ReconError::Precondition(_) => EXIT_PRECONDITION,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
    }
}

/// Map a file service error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Recon(e) => recon_exit_code(e),
        IoError::Unsupported(_) => EXIT_USAGE,
        IoError::Csv(_) => EXIT_FORMAT,
        IoError::Open { .. }
        | IoError::Read { .. }
        | IoError::Write { .. }
        | IoError::ToolMissing { .. }
        | IoError::ToolFailed { .. } => EXIT_IO,
    }
}

/// Exit code for a completed comparison.
pub fn status_exit_code(status: ReconStatus) -> u8 {
    match status {
        ReconStatus::Correct => EXIT_SUCCESS,
        ReconStatus::PartialMatchesOnly => EXIT_PARTIAL_MATCHES,
        ReconStatus::MajorDiscrepancies => EXIT_MAJOR_DISCREPANCIES,
    }
}

/// Machine-readable kind for JSON error output.
pub fn error_kind(code: u8) -> &'static str {
    match code {
        EXIT_USAGE => "usage_error",
        EXIT_IO => "io_error",
        EXIT_FORMAT => "format_error",
        EXIT_EXTRACTION => "extraction_error",
        EXIT_PRECONDITION => "precondition_error",
        EXIT_INVALID_CONFIG => "config_error",
        EXIT_ERROR => "error",
        _ => "error",
    }
}
