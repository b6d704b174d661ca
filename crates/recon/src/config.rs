use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Analyses whose similarity ratio exceeds this are treated as the same.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Preceding lines scanned for reference / installation labels.
pub const LOOKBACK_LINES: usize = 3;

/// Following lines scanned for the secondary code.
pub const LOOKAHEAD_LINES: usize = 1;

/// Leading worksheet rows scanned for the header row.
pub const HEADER_SCAN_ROWS: usize = 5;

pub const DEFAULT_SAMPLE_CODE_PATTERN: &str = r"\d{8}";
pub const DEFAULT_EIX_CODE_PATTERN: &str = r"M-\d{2}-\d{4}";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub worksheet: WorksheetConfig,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Document extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub sample_code_pattern: String,
    pub eix_code_pattern: String,
    pub lookback_lines: usize,
    pub lookahead_lines: usize,
    pub reference_label: String,
    pub installation_labels: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            sample_code_pattern: DEFAULT_SAMPLE_CODE_PATTERN.into(),
            eix_code_pattern: DEFAULT_EIX_CODE_PATTERN.into(),
            lookback_lines: LOOKBACK_LINES,
            lookahead_lines: LOOKAHEAD_LINES,
            reference_label: "Ref.".into(),
            installation_labels: vec!["Instal·lació".into(), "Instalación".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// Worksheet headers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksheetConfig {
    pub header_scan_rows: usize,
    pub headers: HeaderTokens,
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: HEADER_SCAN_ROWS,
            headers: HeaderTokens::default(),
        }
    }
}

/// Literal header cell texts recognized for each canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderTokens {
    pub reference: Vec<String>,
    pub installation: Vec<String>,
    pub provenance: Vec<String>,
    pub sample: Vec<String>,
    pub eix_code: Vec<String>,
    pub analysis: Vec<String>,
}

impl Default for HeaderTokens {
    fn default() -> Self {
        Self {
            reference: vec!["Ref.".into()],
            installation: vec!["Instal·lació".into()],
            provenance: vec!["Procedència".into()],
            sample: vec!["Mostra".into()],
            eix_code: vec!["Codi Eix".into()],
            analysis: vec!["Anàlisis".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let threshold = self.matching.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "matching.similarity_threshold must be in (0, 1], got {threshold}"
            )));
        }

        compile_pattern("extract.sample_code_pattern", &self.extract.sample_code_pattern)?;
        compile_pattern("extract.eix_code_pattern", &self.extract.eix_code_pattern)?;

        if self.extract.reference_label.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "extract.reference_label must not be empty".into(),
            ));
        }
        if self.extract.installation_labels.iter().all(|l| l.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "extract.installation_labels needs at least one non-empty label".into(),
            ));
        }

        if self.worksheet.header_scan_rows == 0 {
            return Err(ReconError::ConfigValidation(
                "worksheet.header_scan_rows must be at least 1".into(),
            ));
        }

        let h = &self.worksheet.headers;
        for (name, tokens) in [
            ("sample", &h.sample),
            ("eix_code", &h.eix_code),
            ("analysis", &h.analysis),
        ] {
            if tokens.iter().all(|t| t.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "worksheet.headers.{name} needs at least one token"
                )));
            }
        }

        Ok(())
    }
}

/// Compile a configured pattern, reporting which key was bad.
pub(crate) fn compile_pattern(key: &str, pattern: &str) -> Result<Regex, ReconError> {
    if pattern.is_empty() {
        return Err(ReconError::ConfigValidation(format!("{key} must not be empty")));
    }
    Regex::new(pattern)
        .map_err(|e| ReconError::ConfigValidation(format!("{key}: invalid pattern: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.matching.similarity_threshold, 0.7);
        assert_eq!(config.extract.lookback_lines, 3);
        assert_eq!(config.extract.lookahead_lines, 1);
        assert_eq!(config.worksheet.header_scan_rows, 5);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ReconConfig::from_toml(
            r#"
[matching]
similarity_threshold = 0.8

[extract]
eix_code_pattern = 'E-\d{3}'

[worksheet.headers]
sample = ["Muestra", "Mostra"]
"#,
        )
        .unwrap();
        assert_eq!(config.matching.similarity_threshold, 0.8);
        assert_eq!(config.extract.eix_code_pattern, r"E-\d{3}");
        assert_eq!(config.extract.sample_code_pattern, r"\d{8}");
        assert_eq!(config.worksheet.headers.sample, vec!["Muestra", "Mostra"]);
        assert_eq!(config.worksheet.headers.analysis, vec!["Anàlisis"]);
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let err = ReconConfig::from_toml("[matching]\nsimilarity_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        let err = ReconConfig::from_toml("[matching]\nsimilarity_threshold = 0.0\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_bad_regex() {
        let err = ReconConfig::from_toml("[extract]\nsample_code_pattern = '(\\d'\n").unwrap_err();
        match err {
            ReconError::ConfigValidation(msg) => assert!(msg.contains("sample_code_pattern")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_missing_mandatory_header_tokens() {
        let err = ReconConfig::from_toml("[worksheet.headers]\nanalysis = []\n").unwrap_err();
        match err {
            ReconError::ConfigValidation(msg) => assert!(msg.contains("analysis")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unparseable_toml() {
        let err = ReconConfig::from_toml("[matching\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn toml_roundtrips_through_show() {
        let text = ReconConfig::default().to_toml().unwrap();
        assert!(text.contains("similarity_threshold"));
        assert_eq!(ReconConfig::from_toml(&text).unwrap(), ReconConfig::default());
    }
}
