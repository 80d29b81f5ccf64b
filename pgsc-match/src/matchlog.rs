//! Per-variant companion log and the JSON run summary.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use fxhash::FxHashMap;
use serde::Serialize;

use pgsc_core::models::{EffectType, LiftStatus, LiftoverRecord, MatchRecord, MatchType, ScoreVariant};
use pgsc_core::Result;
use pgsc_scorefile::qc::{AccessionQc, QcReason, QcSummary};

use crate::matcher::MatchResult;
use crate::report::AccessionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    Unmatched,
    /// strand ambiguous and ambiguous matches were removed
    ExcludedAmbiguous,
    /// dropped by quality control, never matched
    FailedQc,
    /// coordinates could not be lifted to the target build
    FailedLiftover,
}

///
/// One row of the companion log: a scorefile variant of one accession and
/// what happened to it.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchLogRow {
    pub accession: String,
    pub line: usize,
    pub chr: Option<String>,
    pub pos: Option<u64>,
    pub lifted_chr: Option<String>,
    pub lifted_pos: Option<u64>,
    pub liftover: Option<LiftStatus>,
    pub effect_allele: Option<String>,
    pub other_allele: Option<String>,
    pub effect_weight: Option<f64>,
    pub effect_type: Option<EffectType>,
    pub qc_pass: bool,
    pub qc_reason: Option<QcReason>,
    pub match_status: MatchStatus,
    pub match_id: Option<String>,
    pub match_type: Option<MatchType>,
    pub ambiguous: Option<bool>,
    pub accession_pass: bool,
}

impl MatchLogRow {
    fn from_variant(variant: &ScoreVariant) -> Self {
        MatchLogRow {
            accession: variant.accession.clone(),
            line: variant.line,
            chr: Some(variant.chr.clone()),
            pos: Some(variant.pos),
            lifted_chr: None,
            lifted_pos: None,
            liftover: None,
            effect_allele: Some(variant.effect_allele.clone()),
            other_allele: variant.other_allele.clone(),
            effect_weight: Some(variant.effect_weight),
            effect_type: Some(variant.effect_type),
            qc_pass: true,
            qc_reason: None,
            match_status: MatchStatus::Unmatched,
            match_id: None,
            match_type: None,
            ambiguous: None,
            accession_pass: false,
        }
    }

    fn set_match(&mut self, record: &MatchRecord, status: MatchStatus) {
        self.match_status = status;
        self.match_id = Some(record.id().to_string());
        self.match_type = Some(record.match_type);
        self.ambiguous = Some(record.ambiguous);
    }
}

///
/// Everything needed to explain the fate of each scorefile variant.
///
#[derive(Debug, Default)]
pub struct MatchLog<'a> {
    /// variants after QC, before liftover
    pub scorefiles: Option<&'a BTreeMap<String, Vec<ScoreVariant>>>,
    pub qc: Option<&'a QcSummary>,
    pub liftover: &'a [LiftoverRecord],
    pub results: Option<&'a BTreeMap<String, MatchResult>>,
    pub summaries: &'a [AccessionSummary],
}

impl MatchLog<'_> {
    ///
    /// Build the log rows, sorted by accession then scorefile line.
    ///
    pub fn rows(&self) -> Vec<MatchLogRow> {
        let mut rows: Vec<MatchLogRow> = Vec::new();

        let pass: FxHashMap<&str, bool> = self
            .summaries
            .iter()
            .map(|s| (s.accession.as_str(), s.pass))
            .collect();

        let lifted: FxHashMap<(&str, usize), &LiftoverRecord> = self
            .liftover
            .iter()
            .map(|r| ((r.accession.as_str(), r.line), r))
            .collect();

        let mut matched: FxHashMap<(&str, usize), (&MatchRecord, MatchStatus)> = FxHashMap::default();
        for result in self.results.into_iter().flat_map(|r| r.values()) {
            for record in &result.matches {
                matched.insert((record.accession(), record.variant.line), (record, MatchStatus::Matched));
            }
            for record in &result.ambiguous_removed {
                matched.insert(
                    (record.accession(), record.variant.line),
                    (record, MatchStatus::ExcludedAmbiguous),
                );
            }
        }

        if let Some(qc) = self.qc {
            rows.extend(qc.failures.iter().map(|f| MatchLogRow {
                accession: f.accession.clone(),
                line: f.line,
                chr: f.chr.clone(),
                pos: f.pos,
                lifted_chr: None,
                lifted_pos: None,
                liftover: None,
                effect_allele: f.effect_allele.clone(),
                other_allele: f.other_allele.clone(),
                effect_weight: None,
                effect_type: None,
                qc_pass: false,
                qc_reason: Some(f.reason),
                match_status: MatchStatus::FailedQc,
                match_id: None,
                match_type: None,
                ambiguous: None,
                accession_pass: false,
            }));
        }

        for variant in self.scorefiles.into_iter().flat_map(|s| s.values()).flatten() {
            let key = (variant.accession.as_str(), variant.line);
            let mut row = MatchLogRow::from_variant(variant);
            row.accession_pass = pass.get(variant.accession.as_str()).copied().unwrap_or(false);

            if let Some(record) = lifted.get(&key) {
                row.liftover = Some(record.status);
                row.lifted_chr = record.lifted_chr.clone();
                row.lifted_pos = record.lifted_pos;
                if record.status == LiftStatus::Unmapped {
                    row.match_status = MatchStatus::FailedLiftover;
                }
            }

            if let Some((record, status)) = matched.get(&key) {
                row.set_match(record, *status);
            }

            rows.push(row);
        }

        rows.sort_by(|a, b| (&a.accession, a.line).cmp(&(&b.accession, b.line)));
        rows
    }
}

///
/// Write the companion log as a tab separated table with a header.
///
pub fn write_log(path: &Path, rows: &[MatchLogRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(File::create(path)?));

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub dataset: &'a str,
    pub qc: &'a [AccessionQc],
    pub accessions: &'a [AccessionSummary],
    pub errors: Vec<String>,
}

///
/// Write the per accession summary as pretty printed JSON.
///
pub fn write_summary(path: &Path, summary: &RunSummary<'_>) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summary).map_err(std::io::Error::from)?;
    Ok(())
}
