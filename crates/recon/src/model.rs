use serde::Serialize;

use crate::normalize::normalize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One cell of the worksheet grid. `None` (or an empty string) is a missing
/// value.
pub type Cell = Option<String>;

/// One sample, from either the worksheet or the billing document.
///
/// The raw sample code and its join key are only settable together through
/// [`SampleRecord::new`], so `normalize(sample_code) == sample_code_normalized`
/// holds for every record. Absent text fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleRecord {
    pub reference: String,
    pub installation: String,
    pub provenance: String,
    sample_code: String,
    sample_code_normalized: String,
    pub eix_code: String,
    pub analysis: String,
    /// 1-based worksheet row or document line the record came from.
    pub source_line: usize,
}

impl SampleRecord {
    pub fn new(sample_code: impl Into<String>) -> Self {
        let sample_code = sample_code.into();
        let sample_code_normalized = normalize(&sample_code);
        Self {
            reference: String::new(),
            installation: String::new(),
            provenance: String::new(),
            sample_code,
            sample_code_normalized,
            eix_code: String::new(),
            analysis: String::new(),
            source_line: 0,
        }
    }

    pub fn with_eix_code(mut self, eix_code: impl Into<String>) -> Self {
        self.eix_code = eix_code.into();
        self
    }

    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = analysis.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_installation(mut self, installation: impl Into<String>) -> Self {
        self.installation = installation.into();
        self
    }

    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    pub fn at_line(mut self, source_line: usize) -> Self {
        self.source_line = source_line;
        self
    }

    /// The sample code exactly as it appeared in the source.
    pub fn sample_code(&self) -> &str {
        &self.sample_code
    }

    /// The join key between worksheet and document.
    pub fn key(&self) -> &str {
        &self.sample_code_normalized
    }
}

// ---------------------------------------------------------------------------
// Reconciliation output
// ---------------------------------------------------------------------------

/// A worksheet record and the document record billed under the same key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPair {
    pub worksheet: SampleRecord,
    pub document: SampleRecord,
    pub eix_code_matches: bool,
    pub analysis_matches: bool,
}

impl MatchedPair {
    pub fn is_exact(&self) -> bool {
        self.eix_code_matches && self.analysis_matches
    }
}

/// Five ordered buckets; every input record lands in exactly one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconResult {
    pub exact_matches: Vec<MatchedPair>,
    pub partial_matches: Vec<MatchedPair>,
    pub worksheet_only: Vec<SampleRecord>,
    pub document_only: Vec<SampleRecord>,
    pub document_duplicates: Vec<SampleRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconStatus {
    Correct,
    MajorDiscrepancies,
    PartialMatchesOnly,
}

impl std::fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Correct => write!(f, "CORRECT"),
            Self::MajorDiscrepancies => write!(f, "MAJOR_DISCREPANCIES"),
            Self::PartialMatchesOnly => write!(f, "PARTIAL_MATCHES_ONLY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconStats {
    pub total_worksheet: usize,
    pub total_document: usize,
    pub exact_matches: usize,
    pub partial_matches: usize,
    pub worksheet_only: usize,
    pub document_only: usize,
    pub document_duplicates: usize,
    pub status: ReconStatus,
}
