//! Quality control applied to each accession after reading.

use std::collections::HashMap;
use std::fmt::{self, Display};

use fxhash::FxHashSet;
use log::warn;
use serde::Serialize;

use pgsc_core::consts::PRESENCE_ABSENCE_ALLELES;
use pgsc_core::models::{EffectType, ScoreVariant};
use pgsc_core::{PgscError, Result};

/// One data row of a scorefile for a single weight column, before QC.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariant {
    pub line: usize,
    pub chr: Option<String>,
    pub pos: Option<u64>,
    pub effect_allele: Option<String>,
    pub other_allele: Option<String>,
    pub effect_weight: Option<f64>,
    pub effect_type: EffectType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QcReason {
    MissingChromosome,
    MissingPosition,
    MissingEffectAllele,
    MissingWeight,
    PresenceAbsenceAllele,
}

impl Display for QcReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QcReason::MissingChromosome => "missing_chromosome",
            QcReason::MissingPosition => "missing_position",
            QcReason::MissingEffectAllele => "missing_effect_allele",
            QcReason::MissingWeight => "missing_weight",
            QcReason::PresenceAbsenceAllele => "presence_absence_allele",
        };
        write!(f, "{}", s)
    }
}

/// A row dropped by quality control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcFailure {
    pub accession: String,
    pub line: usize,
    pub chr: Option<String>,
    pub pos: Option<u64>,
    pub effect_allele: Option<String>,
    pub other_allele: Option<String>,
    pub reason: QcReason,
}

/// Per accession QC counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessionQc {
    pub accession: String,
    pub n_rows: usize,
    pub n_pass: usize,
    pub n_fail: usize,
    /// Set when the whole accession was discarded.
    pub skipped: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QcSummary {
    pub accessions: Vec<AccessionQc>,
    pub failures: Vec<QcFailure>,
}

impl QcSummary {
    pub fn merge(&mut self, other: QcSummary) {
        self.accessions.extend(other.accessions);
        self.failures.extend(other.failures);
    }

    pub fn is_skipped(&self, accession: &str) -> bool {
        self.accessions
            .iter()
            .any(|a| a.accession == accession && a.skipped.is_some())
    }
}

/// Result of running QC over the rows of one accession.
#[derive(Debug, Clone)]
pub struct QcOutcome {
    /// `None` when the accession was discarded.
    pub variants: Option<Vec<ScoreVariant>>,
    pub summary: AccessionQc,
    pub failures: Vec<QcFailure>,
}

fn check_row(row: &RawVariant) -> Option<QcReason> {
    if row.chr.is_none() {
        return Some(QcReason::MissingChromosome);
    }
    if row.pos.is_none() {
        return Some(QcReason::MissingPosition);
    }
    if row.effect_weight.is_none() {
        return Some(QcReason::MissingWeight);
    }
    match row.effect_allele.as_deref() {
        None => Some(QcReason::MissingEffectAllele),
        Some(ea) if PRESENCE_ABSENCE_ALLELES.contains(&ea) => Some(QcReason::PresenceAbsenceAllele),
        Some(_) => None,
    }
}

///
/// Apply quality control to the rows of one accession.
///
/// - rows without chromosome, position, weight or effect allele are dropped
/// - a duplicated (chromosome, position, effect allele, other allele) key is fatal
/// - a position carrying more than one distinct weight discards the accession
///
pub fn quality_control(accession: &str, rows: Vec<RawVariant>) -> Result<QcOutcome> {
    let n_rows = rows.len();
    let mut variants: Vec<ScoreVariant> = Vec::with_capacity(n_rows);
    let mut failures: Vec<QcFailure> = Vec::new();

    for row in rows {
        if let Some(reason) = check_row(&row) {
            failures.push(QcFailure {
                accession: accession.to_string(),
                line: row.line,
                chr: row.chr,
                pos: row.pos,
                effect_allele: row.effect_allele,
                other_allele: row.other_allele,
                reason,
            });
            continue;
        }

        // check_row guarantees the mandatory fields are present
        if let (Some(chr), Some(pos), Some(effect_allele), Some(effect_weight)) =
            (row.chr, row.pos, row.effect_allele, row.effect_weight)
        {
            variants.push(ScoreVariant {
                chr,
                pos,
                effect_allele,
                other_allele: row.other_allele,
                effect_weight,
                effect_type: row.effect_type,
                accession: accession.to_string(),
                line: row.line,
            });
        }
    }

    let mut seen = FxHashSet::default();
    for variant in &variants {
        if !seen.insert(variant.key()) {
            return Err(PgscError::DuplicateIdentifier {
                accession: accession.to_string(),
                chr: variant.chr.clone(),
                pos: variant.pos,
                effect_allele: variant.effect_allele.clone(),
                other_allele: variant.other_allele.clone().unwrap_or_else(|| "NA".to_string()),
            });
        }
    }

    let mut summary = AccessionQc {
        accession: accession.to_string(),
        n_rows,
        n_pass: variants.len(),
        n_fail: failures.len(),
        skipped: None,
    };

    if let Some((chr, pos)) = position_with_multiple_weights(&variants) {
        warn!(
            "{}: position {}:{} has more than one effect weight, skipping scorefile",
            accession, chr, pos
        );
        summary.skipped = Some(format!("multiple effect weights at {}:{}", chr, pos));
        return Ok(QcOutcome {
            variants: None,
            summary,
            failures,
        });
    }

    if variants.is_empty() {
        warn!("{}: no variants passed quality control", accession);
    }

    Ok(QcOutcome {
        variants: Some(variants),
        summary,
        failures,
    })
}

fn position_with_multiple_weights(variants: &[ScoreVariant]) -> Option<(String, u64)> {
    let mut weights: HashMap<(&str, u64), u64> = HashMap::new();
    for variant in variants {
        let bits = variant.effect_weight.to_bits();
        match weights.get(&(variant.chr.as_str(), variant.pos)) {
            Some(&existing) if existing != bits => {
                return Some((variant.chr.clone(), variant.pos));
            }
            Some(_) => {}
            None => {
                weights.insert((variant.chr.as_str(), variant.pos), bits);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn row(line: usize, pos: Option<u64>, ea: &str, oa: Option<&str>, weight: Option<f64>) -> RawVariant {
        RawVariant {
            line,
            chr: Some("22".to_string()),
            pos,
            effect_allele: Some(ea.to_string()),
            other_allele: oa.map(String::from),
            effect_weight: weight,
            effect_type: EffectType::Additive,
        }
    }

    #[fixture]
    fn good_rows() -> Vec<RawVariant> {
        vec![
            row(2, Some(22561610), "A", Some("G"), Some(1.0)),
            row(3, Some(22561700), "C", None, Some(-0.5)),
        ]
    }

    #[rstest]
    fn test_good_rows_pass(good_rows: Vec<RawVariant>) {
        let outcome = quality_control("PGS000001", good_rows).unwrap();
        let variants = outcome.variants.unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].other_allele, None);
        assert_eq!(outcome.summary.n_pass, 2);
        assert_eq!(outcome.summary.n_fail, 0);
    }

    #[rstest]
    fn test_missing_fields_are_dropped(mut good_rows: Vec<RawVariant>) {
        good_rows.push(row(4, None, "A", Some("G"), Some(1.0)));
        good_rows.push(row(5, Some(100), "A", Some("G"), None));
        let mut no_chr = row(6, Some(200), "A", Some("G"), Some(1.0));
        no_chr.chr = None;
        good_rows.push(no_chr);
        good_rows.push(row(7, Some(300), "P", None, Some(1.0)));

        let outcome = quality_control("PGS000001", good_rows).unwrap();
        assert_eq!(outcome.variants.unwrap().len(), 2);
        let reasons: Vec<QcReason> = outcome.failures.iter().map(|f| f.reason).collect();
        assert_eq!(
            reasons,
            vec![
                QcReason::MissingPosition,
                QcReason::MissingWeight,
                QcReason::MissingChromosome,
                QcReason::PresenceAbsenceAllele
            ]
        );
    }

    #[rstest]
    fn test_duplicate_variant_is_fatal(good_rows: Vec<RawVariant>) {
        let mut rows = good_rows.clone();
        rows.extend(good_rows);
        let result = quality_control("PGS000001", rows);
        assert!(matches!(result, Err(PgscError::DuplicateIdentifier { pos: 22561610, .. })));
    }

    #[rstest]
    fn test_multiple_weights_skips_accession(mut good_rows: Vec<RawVariant>) {
        good_rows.push(row(4, Some(22561610), "T", Some("G"), Some(0.3)));
        let outcome = quality_control("PGS000001", good_rows).unwrap();
        assert!(outcome.variants.is_none());
        assert!(outcome.summary.skipped.is_some());
    }

    #[rstest]
    fn test_same_weight_at_position_is_kept(mut good_rows: Vec<RawVariant>) {
        good_rows.push(row(4, Some(22561610), "T", Some("G"), Some(1.0)));
        let outcome = quality_control("PGS000001", good_rows).unwrap();
        assert_eq!(outcome.variants.unwrap().len(), 3);
    }
}
