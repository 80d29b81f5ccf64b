//! Gate accessions on the fraction of their variants found in the target.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use pgsc_core::{PgscError, Result};

use crate::matcher::MatchResult;

///
/// What to do when an accession fails the match rate gate.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPolicy {
    /// the first failing accession aborts the run
    #[default]
    Strict,
    /// failing accessions are left out of the output, the others are written
    SkipFailing,
}

impl FromStr for ReportPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "strict" => Ok(ReportPolicy::Strict),
            "skip_failing" | "skip-failing" => Ok(ReportPolicy::SkipFailing),
            _ => Err(format!("Unknown report policy: {}", s)),
        }
    }
}

impl Display for ReportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPolicy::Strict => write!(f, "strict"),
            ReportPolicy::SkipFailing => write!(f, "skip_failing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessionSummary {
    pub accession: String,
    pub n_variants: usize,
    pub n_matched: usize,
    pub n_ambiguous: usize,
    pub n_unmatched: usize,
    pub failed_fraction: f64,
    pub pass: bool,
}

/// An accession without variants has nothing matched.
pub fn failed_fraction(unmatched: usize, total: usize) -> f64 {
    match total {
        0 => 1.0,
        n => unmatched as f64 / n as f64,
    }
}

///
/// Fail when `failed_fraction >= 1 - min_overlap`.
///
/// Compared as `matched / total <= min_overlap`, since `1.0 - min_overlap`
/// rounds up for thresholds such as 0.95.
///
pub fn check_match_rate(accession: &str, unmatched: usize, total: usize, min_overlap: f64) -> Result<f64> {
    let failed = failed_fraction(unmatched, total);
    let matched = total.saturating_sub(unmatched);
    if total == 0 || matched as f64 / total as f64 <= min_overlap {
        return Err(PgscError::MatchRate {
            accession: accession.to_string(),
            unmatched,
            total,
            failed_fraction: failed,
            min_overlap,
        });
    }
    Ok(failed)
}

pub fn summarise(result: &MatchResult, min_overlap: f64) -> AccessionSummary {
    let (failed, pass) = match check_match_rate(
        &result.accession,
        result.n_unmatched(),
        result.n_variants,
        min_overlap,
    ) {
        Ok(failed) => (failed, true),
        Err(_) => (failed_fraction(result.n_unmatched(), result.n_variants), false),
    };

    AccessionSummary {
        accession: result.accession.clone(),
        n_variants: result.n_variants,
        n_matched: result.n_matched(),
        n_ambiguous: result.n_ambiguous(),
        n_unmatched: result.n_unmatched(),
        failed_fraction: failed,
        pass,
    }
}

///
/// Per accession pass/fail, plus the errors of the accessions that were
/// skipped under [ReportPolicy::SkipFailing].
///
#[derive(Debug, Default)]
pub struct MatchReport {
    pub summaries: Vec<AccessionSummary>,
    pub errors: Vec<PgscError>,
}

impl MatchReport {
    pub fn passed(&self) -> impl Iterator<Item = &str> {
        self.summaries
            .iter()
            .filter(|s| s.pass)
            .map(|s| s.accession.as_str())
    }

    pub fn is_pass(&self, accession: &str) -> bool {
        self.summaries
            .iter()
            .any(|s| s.accession == accession && s.pass)
    }
}

///
/// Check the match rate of every accession.
///
/// # Arguments
/// - results: match results keyed by accession
/// - min_overlap: minimum fraction of variants that must match
/// - policy: abort on the first failure, or skip failing accessions
///
pub fn check(
    results: &BTreeMap<String, MatchResult>,
    min_overlap: f64,
    policy: ReportPolicy,
) -> Result<MatchReport> {
    let mut report = MatchReport::default();

    for result in results.values() {
        let summary = summarise(result, min_overlap);
        info!(
            "{}: {}/{} variants matched ({} ambiguous), {}",
            summary.accession,
            summary.n_matched,
            summary.n_variants,
            summary.n_ambiguous,
            if summary.pass { "pass" } else { "fail" }
        );

        if !summary.pass {
            let err = PgscError::MatchRate {
                accession: summary.accession.clone(),
                unmatched: summary.n_unmatched,
                total: summary.n_variants,
                failed_fraction: summary.failed_fraction,
                min_overlap,
            };
            match policy {
                ReportPolicy::Strict => {
                    error!("{}", err);
                    return Err(err);
                }
                ReportPolicy::SkipFailing => {
                    warn!("{}, skipping", err);
                    report.errors.push(err);
                }
            }
        }

        report.summaries.push(summary);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn result(accession: &str, n_variants: usize, n_matched: usize) -> MatchResult {
        use pgsc_core::models::{EffectType, MatchRecord, MatchType, ScoreVariant, TargetVariant};

        let record = MatchRecord {
            variant: ScoreVariant {
                chr: "1".to_string(),
                pos: 1,
                effect_allele: "A".to_string(),
                other_allele: Some("G".to_string()),
                effect_weight: 1.0,
                effect_type: EffectType::Additive,
                accession: accession.to_string(),
                line: 2,
            },
            target: TargetVariant {
                chr: "1".to_string(),
                pos: 1,
                id: "1:1:A:G".to_string(),
                ref_allele: "A".to_string(),
                alt_allele: "G".to_string(),
            },
            match_type: MatchType::RefAlt,
            ambiguous: false,
        };

        MatchResult {
            accession: accession.to_string(),
            n_variants,
            matches: vec![record; n_matched],
            ambiguous_removed: Vec::new(),
        }
    }

    #[rstest]
    #[case(0, 10, 0.0)]
    #[case(5, 10, 0.5)]
    #[case(0, 0, 1.0)]
    fn test_failed_fraction(#[case] unmatched: usize, #[case] total: usize, #[case] expected: f64) {
        assert_eq!(failed_fraction(unmatched, total), expected);
    }

    #[rstest]
    fn test_zero_matches_fails_gate() {
        let err = check_match_rate("PGS000001", 1, 1, 0.95).unwrap_err();
        assert!(matches!(
            err,
            PgscError::MatchRate { failed_fraction, min_overlap, .. }
                if failed_fraction == 1.0 && min_overlap == 0.95
        ));
    }

    #[rstest]
    fn test_boundary_fails_gate() {
        // failed fraction 0.5 equals 1 - 0.5
        assert!(check_match_rate("PGS000001", 5, 10, 0.5).is_err());
        assert!(check_match_rate("PGS000001", 4, 10, 0.5).is_ok());
    }

    #[rstest]
    #[case(1, 20, 0.95)]
    #[case(1, 10, 0.9)]
    #[case(3, 10, 0.7)]
    #[case(0, 0, 0.75)]
    fn test_inexact_threshold_fails_gate(#[case] unmatched: usize, #[case] total: usize, #[case] min_overlap: f64) {
        assert!(check_match_rate("PGS000001", unmatched, total, min_overlap).is_err());
    }

    #[rstest]
    #[case(1, 21, 0.95)]
    #[case(2, 10, 0.75)]
    fn test_just_above_threshold_passes(#[case] unmatched: usize, #[case] total: usize, #[case] min_overlap: f64) {
        assert!(check_match_rate("PGS000001", unmatched, total, min_overlap).is_ok());
    }

    #[fixture]
    fn results() -> BTreeMap<String, MatchResult> {
        let mut results = BTreeMap::new();
        results.insert("PGS000001".to_string(), result("PGS000001", 4, 4));
        results.insert("PGS000002".to_string(), result("PGS000002", 4, 1));
        results
    }

    #[rstest]
    fn test_strict_policy_aborts(results: BTreeMap<String, MatchResult>) {
        assert!(matches!(
            check(&results, 0.75, ReportPolicy::Strict),
            Err(PgscError::MatchRate { ref accession, .. }) if accession == "PGS000002"
        ));
    }

    #[rstest]
    fn test_skip_failing_policy(results: BTreeMap<String, MatchResult>) {
        let report = check(&results, 0.75, ReportPolicy::SkipFailing).unwrap();
        assert_eq!(report.passed().collect::<Vec<_>>(), vec!["PGS000001"]);
        assert!(!report.is_pass("PGS000002"));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.summaries[1].n_unmatched, 3);
    }

    #[rstest]
    #[case("strict", ReportPolicy::Strict)]
    #[case("skip_failing", ReportPolicy::SkipFailing)]
    #[case("skip-failing", ReportPolicy::SkipFailing)]
    fn test_policy_from_str(#[case] value: &str, #[case] expected: ReportPolicy) {
        assert_eq!(value.parse::<ReportPolicy>().unwrap(), expected);
    }
}
