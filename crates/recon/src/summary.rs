use crate::model::{ReconResult, ReconStats, ReconStatus};

/// Compute counts and the overall status from a reconciliation result.
///
/// Totals are passed in rather than derived from the buckets: earlier rows
/// of a repeated worksheet key that was billed appear in no bucket.
pub fn compute_stats(result: &ReconResult, worksheet_total: usize, document_total: usize) -> ReconStats {
    let status = if result.worksheet_only.is_empty()
        && result.document_only.is_empty()
        && result.document_duplicates.is_empty()
        && result.partial_matches.is_empty()
    {
        ReconStatus::Correct
    } else if !result.worksheet_only.is_empty()
        || !result.document_only.is_empty()
        || !result.document_duplicates.is_empty()
    {
        ReconStatus::MajorDiscrepancies
    } else {
        ReconStatus::PartialMatchesOnly
    };

    ReconStats {
        total_worksheet: worksheet_total,
        total_document: document_total,
        exact_matches: result.exact_matches.len(),
        partial_matches: result.partial_matches.len(),
        worksheet_only: result.worksheet_only.len(),
        document_only: result.document_only.len(),
        document_duplicates: result.document_duplicates.len(),
        status,
    }
}

impl ReconStats {
    /// Share of worksheet records that were not billed, 0–100.
    pub fn worksheet_only_percent(&self) -> f64 {
        if self.total_worksheet == 0 {
            return 0.0;
        }
        self.worksheet_only as f64 * 100.0 / self.total_worksheet as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchedPair, SampleRecord};

    fn pair(exact: bool) -> MatchedPair {
        MatchedPair {
            worksheet: SampleRecord::new("00000001"),
            document: SampleRecord::new("00000001"),
            eix_code_matches: true,
            analysis_matches: exact,
        }
    }

    #[test]
    fn all_exact_is_correct() {
        let result = ReconResult {
            exact_matches: vec![pair(true), pair(true)],
            ..Default::default()
        };
        let stats = compute_stats(&result, 2, 2);
        assert_eq!(stats.status, ReconStatus::Correct);
        assert_eq!(stats.exact_matches, 2);
        assert_eq!(stats.total_worksheet, 2);
    }

    #[test]
    fn partial_only() {
        let result = ReconResult {
            exact_matches: vec![pair(true)],
            partial_matches: vec![pair(false)],
            ..Default::default()
        };
        assert_eq!(compute_stats(&result, 2, 2).status, ReconStatus::PartialMatchesOnly);
    }

    #[test]
    fn one_sided_records_outrank_partials() {
        let result = ReconResult {
            partial_matches: vec![pair(false)],
            worksheet_only: vec![SampleRecord::new("00000002")],
            ..Default::default()
        };
        assert_eq!(compute_stats(&result, 2, 1).status, ReconStatus::MajorDiscrepancies);

        let result = ReconResult {
            exact_matches: vec![pair(true)],
            document_duplicates: vec![SampleRecord::new("00000001")],
            ..Default::default()
        };
        let stats = compute_stats(&result, 1, 2);
        assert_eq!(stats.status, ReconStatus::MajorDiscrepancies);
        assert_eq!(stats.document_duplicates, 1);
    }

    #[test]
    fn worksheet_only_share() {
        let result = ReconResult {
            exact_matches: vec![pair(true)],
            worksheet_only: vec![SampleRecord::new("2"), SampleRecord::new("3"), SampleRecord::new("4")],
            ..Default::default()
        };
        let stats = compute_stats(&result, 4, 1);
        assert!((stats.worksheet_only_percent() - 75.0).abs() < 1e-9);

        let empty = compute_stats(&ReconResult::default(), 0, 0);
        assert_eq!(empty.worksheet_only_percent(), 0.0);
    }
}
