// sampleaudit CLI - reconcile lab sample worksheets against billing documents

mod compare;
mod config_cmd;
mod dump;
mod exit_codes;
mod logging;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use sampleaudit_io::IoError;
use sampleaudit_recon::ReconError;

use exit_codes::{error_kind, io_exit_code, recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "saudit")]
#[command(about = "Reconcile a lab sample worksheet against the invoice that bills it")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Config file (default: $SAUDIT_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug; RUST_LOG overrides)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a worksheet against an invoice and report discrepancies
    #[command(after_help = "\
Examples:
  saudit compare --worksheet october.xlsx --invoice F2025-0412.pdf
  saudit compare --worksheet october.csv --invoice invoice.txt --json
  saudit compare -w october.xlsx -i F2025-0412.pdf --output report.json --export-dir buckets/

Exit codes:
  0   every sample matched exactly (CORRECT)
  10  all samples paired, some code or analysis differs (PARTIAL_MATCHES_ONLY)
  11  unbilled, unknown or double-billed samples (MAJOR_DISCREPANCIES)")]
    Compare {
        /// Worksheet file (.xlsx, .xls, .xlsb, .ods, .csv, .tsv)
        #[arg(long, short = 'w')]
        worksheet: PathBuf,

        /// Invoice (.pdf, or pre-extracted .txt)
        #[arg(long, short = 'i')]
        invoice: PathBuf,

        /// Print the JSON report to stdout instead of the human summary
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write one CSV per bucket into this directory
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,

        /// Suppress progress and summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Dump the sample records extracted from an invoice
    #[command(after_help = "\
Examples:
  saudit extract --invoice F2025-0412.pdf
  saudit extract --invoice F2025-0412.pdf --json
  saudit extract --invoice F2025-0412.pdf --out invoice-samples.csv")]
    Extract {
        /// Invoice (.pdf, or pre-extracted .txt)
        #[arg(long, short = 'i')]
        invoice: PathBuf,

        /// Write CSV to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the sample records loaded from a worksheet
    #[command(after_help = "\
Examples:
  saudit load --worksheet october.xlsx
  saudit load --worksheet october.csv --json")]
    Load {
        /// Worksheet file (.xlsx, .xls, .xlsb, .ods, .csv, .tsv)
        #[arg(long, short = 'w')]
        worksheet: PathBuf,

        /// Write CSV to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or check configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Compare { json, .. }
            | Commands::Extract { json, .. }
            | Commands::Load { json, .. } => *json,
            Commands::Config(_) => false,
        }
    }

    fn is_quiet(&self) -> bool {
        matches!(self, Commands::Compare { quiet: true, .. })
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  sampleaudit-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
        "\nreport_version: 1",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.command.is_quiet());

    let json_errors = cli.command.wants_json();

    let config_flag = cli.config;
    let resolve_settings = || settings::Settings::resolve(config_flag.as_deref());

    let result = match cli.command {
        Commands::Compare { worksheet, invoice, json, output, export_dir, quiet } => resolve_settings().and_then(|s| {
            compare::cmd_compare(
                compare::CompareArgs { worksheet, invoice, json, output, export_dir, quiet },
                &s,
            )
        }),
        Commands::Extract { invoice, out, json } => {
            resolve_settings().and_then(|s| dump::cmd_extract(invoice, out, json, &s))
        }
        Commands::Load { worksheet, out, json } => {
            resolve_settings().and_then(|s| dump::cmd_load(worksheet, out, json, &s))
        }
        Commands::Config(cmd) => config_cmd::cmd_config(cmd, config_flag.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            err.print(json_errors);
            ExitCode::from(err.code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    /// Exit with `code` and no message (the command already reported).
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn print(&self, json: bool) {
        if self.message.is_empty() {
            return;
        }
        if json {
            let out = serde_json::json!({
                "error": error_kind(self.code),
                "message": self.message,
                "hint": self.hint,
                "exit_code": self.code,
            });
            eprintln!("{out}");
        } else {
            eprintln!("error: {}", self.message);
            if let Some(hint) = &self.hint {
                eprintln!("hint:  {}", hint);
            }
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::Format(_) => {
                Some("the header row must sit in the first rows and name the Mostra, Codi Eix and Anàlisis columns")
            }
            ReconError::Extraction(_) => {
                Some("scanned invoices carry no text; check with: pdftotext -layout <file> -")
            }
            _ => None,
        };
        Self {
            code: recon_exit_code(&err),
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Recon(inner) => inner.into(),
            other => Self {
                code: io_exit_code(&other),
                message: other.to_string(),
                hint: other.hint().map(str::to_string),
            },
        }
    }
}
