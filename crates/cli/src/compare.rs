//! `saudit compare`: full worksheet vs. invoice reconciliation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use sampleaudit_io::{load_worksheet_file, read_document_text, write_bucket_csvs, write_json};
use sampleaudit_recon::{compute_stats, reconcile, Extractor, MatchedPair, ReconResult, ReconStats, SampleRecord};

use crate::exit_codes::{status_exit_code, EXIT_SUCCESS};
use crate::settings::Settings;
use crate::CliError;

pub const REPORT_VERSION: u32 = 1;

pub struct CompareArgs {
    pub worksheet: PathBuf,
    pub invoice: PathBuf,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ReportMeta {
    report_version: u32,
    tool_version: &'static str,
    run_at: String,
    worksheet: String,
    invoice: String,
    config: String,
    similarity_threshold: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    meta: ReportMeta,
    stats: &'a ReconStats,
    worksheet_only_percent: f64,
    result: &'a ReconResult,
}

pub fn cmd_compare(args: CompareArgs, settings: &Settings) -> Result<(), CliError> {
    let config = &settings.config;
    let extractor = Extractor::new(&config.extract)?;

    let worksheet = load_worksheet_file(&args.worksheet, &config.worksheet)?;
    if !args.quiet {
        eprintln!("Loaded {} worksheet record(s) from {}", worksheet.len(), args.worksheet.display());
    }

    let text = read_document_text(&args.invoice)?;
    let document = extractor.extract(&text)?;
    if !args.quiet {
        eprintln!("Extracted {} invoice record(s) from {}", document.len(), args.invoice.display());
    }

    let result = reconcile(&worksheet, &document, config)?;
    let stats = compute_stats(&result, worksheet.len(), document.len());

    let report = Report {
        meta: ReportMeta {
            report_version: REPORT_VERSION,
            tool_version: env!("CARGO_PKG_VERSION"),
            run_at: chrono::Utc::now().to_rfc3339(),
            worksheet: display_path(&args.worksheet),
            invoice: display_path(&args.invoice),
            config: settings.source.to_string(),
            similarity_threshold: config.matching.similarity_threshold,
        },
        stats: &stats,
        worksheet_only_percent: stats.worksheet_only_percent(),
        result: &result,
    };

    if let Some(ref path) = args.output {
        write_json(&report, path)?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if let Some(ref dir) = args.export_dir {
        let files = write_bucket_csvs(&result, dir)?;
        if !args.quiet {
            eprintln!("wrote {} bucket file(s) to {}", files.len(), dir.display());
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else if !args.quiet {
        eprint!("{}", render_summary(&stats, &result));
    }

    match status_exit_code(stats.status) {
        EXIT_SUCCESS => Ok(()),
        code => Err(CliError::silent(code)),
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Human-readable summary: counts, then one section per non-empty bucket.
fn render_summary(stats: &ReconStats, result: &ReconResult) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!("Status: {}\n", stats.status));
    out.push_str(&format!("  worksheet records   {:>6}\n", stats.total_worksheet));
    out.push_str(&format!("  invoice records     {:>6}\n", stats.total_document));
    out.push_str(&format!("  exact matches       {:>6}\n", stats.exact_matches));
    out.push_str(&format!("  partial matches     {:>6}\n", stats.partial_matches));
    out.push_str(&format!(
        "  not billed          {:>6}  ({:.1}% of worksheet)\n",
        stats.worksheet_only,
        stats.worksheet_only_percent()
    ));
    out.push_str(&format!("  not in worksheet    {:>6}\n", stats.document_only));
    out.push_str(&format!("  billed twice        {:>6}\n", stats.document_duplicates));

    if !result.partial_matches.is_empty() {
        out.push_str("\nPartial matches:\n");
        for pair in &result.partial_matches {
            out.push_str(&partial_line(pair));
        }
    }

    for (title, records) in [
        ("Not billed (worksheet only)", &result.worksheet_only),
        ("Not in worksheet (invoice only)", &result.document_only),
        ("Billed more than once", &result.document_duplicates),
    ] {
        if records.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{title}:\n"));
        for r in records {
            out.push_str(&record_line(r));
        }
    }

    out
}

fn partial_line(pair: &MatchedPair) -> String {
    let mut diffs = Vec::new();
    if !pair.eix_code_matches {
        diffs.push(format!("eix {} vs {}", quoted(&pair.worksheet.eix_code), quoted(&pair.document.eix_code)));
    }
    if !pair.analysis_matches {
        diffs.push(format!(
            "analysis {} vs {}",
            quoted(&pair.worksheet.analysis),
            quoted(&pair.document.analysis)
        ));
    }
    format!("  {}  {}\n", pair.worksheet.sample_code(), diffs.join("; "))
}

fn record_line(r: &SampleRecord) -> String {
    format!(
        "  {}  {}  {}  (line {})\n",
        r.sample_code(),
        if r.eix_code.is_empty() { "-" } else { r.eix_code.as_str() },
        r.analysis,
        r.source_line
    )
}

fn quoted(s: &str) -> String {
    if s.is_empty() {
        "(empty)".to_string()
    } else {
        format!("'{s}'")
    }
}
