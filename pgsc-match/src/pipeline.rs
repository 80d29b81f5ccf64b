//! Read, lift, match, report and write in one run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use log::{info, warn};

use pgsc_core::models::{GenomeBuild, LiftoverRecord, ScoreVariant};
use pgsc_core::{PgscError, Result};
use pgsc_liftover::CoordinateLifter;
use pgsc_scorefile::{QcSummary, WriterOptions, check_build, read_scorefile, write_tables};

use crate::config::MatchConfig;
use crate::consts::{LOG_SUFFIX, SUMMARY_SUFFIX};
use crate::dedup::build_tables;
use crate::matcher::match_scorefiles;
use crate::matchlog::{MatchLog, RunSummary, write_log, write_summary};
use crate::report::{MatchReport, ReportPolicy, check};
use crate::target::TargetIndex;

#[derive(Debug)]
pub struct PipelineOutput {
    pub scorefiles: Vec<PathBuf>,
    pub log: PathBuf,
    pub summary: PathBuf,
    pub report: MatchReport,
}

/// Scorefiles read from disk, keyed by accession.
#[derive(Debug, Default)]
pub struct ReadScorefiles {
    pub scorefiles: BTreeMap<String, Vec<ScoreVariant>>,
    pub builds: FxHashMap<String, Option<GenomeBuild>>,
    pub qc: QcSummary,
}

pub fn read_scorefiles<P: AsRef<Path>>(paths: &[P]) -> Result<ReadScorefiles> {
    let mut read = ReadScorefiles::default();

    for path in paths {
        let set = read_scorefile(path.as_ref())?;
        for (accession, variants) in set.scorefiles {
            if read.scorefiles.contains_key(&accession) {
                warn!("{}: accession read more than once, keeping the last", accession);
            }
            read.builds.insert(accession.clone(), set.genome_build);
            read.scorefiles.insert(accession, variants);
        }
        read.qc.merge(set.qc);
    }

    Ok(read)
}

///
/// Lift every accession to `to`. Accessions that can't be lifted abort the run
/// under [ReportPolicy::Strict] and are dropped otherwise.
///
fn lift_scorefiles(
    read: &ReadScorefiles,
    to: GenomeBuild,
    config: &MatchConfig,
    errors: &mut Vec<PgscError>,
) -> Result<(BTreeMap<String, Vec<ScoreVariant>>, Vec<LiftoverRecord>)> {
    let lifter = match &config.chain_dir {
        Some(dir) => CoordinateLifter::from_dir(dir)?,
        None => CoordinateLifter::new(),
    };

    let mut lifted = BTreeMap::new();
    let mut records = Vec::new();

    for (accession, variants) in &read.scorefiles {
        let build = read.builds.get(accession).copied().flatten();
        let outcome = check_build(accession, build).and_then(|from| {
            lifter.lift(accession, variants.clone(), from, to, config.min_liftover)
        });

        match (outcome, config.policy) {
            (Ok(outcome), _) => {
                records.extend(outcome.records);
                lifted.insert(accession.clone(), outcome.mapped);
            }
            (Err(err), ReportPolicy::Strict) => return Err(err),
            (Err(err), ReportPolicy::SkipFailing) => {
                warn!("{}, skipping", err);
                errors.push(err);
            }
        }
    }

    Ok((lifted, records))
}

///
/// Run the whole matching workflow and write its outputs to `outdir`:
/// the scoring tables, `<dataset>_log.tsv` and `<dataset>_summary.json`.
///
/// # Arguments
/// - scorefile_paths: PGS Catalog scorefiles
/// - target_paths: `.bim` or `.pvar` target variant tables
/// - dataset: name used to prefix every output file
/// - outdir: output directory
/// - config: thresholds and options
///
pub fn run_pipeline<P: AsRef<Path>, Q: AsRef<Path>>(
    scorefile_paths: &[P],
    target_paths: &[Q],
    dataset: &str,
    outdir: &Path,
    config: &MatchConfig,
) -> Result<PipelineOutput> {
    let read = read_scorefiles(scorefile_paths)?;
    info!(
        "Read {} scorefile(s) with {} accession(s)",
        scorefile_paths.len(),
        read.scorefiles.len()
    );

    let mut lift_errors = Vec::new();
    let (to_match, liftover_records) = match config.target_build {
        Some(to) => lift_scorefiles(&read, to, config, &mut lift_errors)?,
        None => (read.scorefiles.clone(), Vec::new()),
    };

    let target = TargetIndex::from_paths(target_paths, config.remove_multiallelic)?;
    let mut results = match_scorefiles(&target, &to_match, config.remove_ambiguous)?;

    // variants lost at liftover never reached the target and count as unmatched
    for result in results.values_mut() {
        if let Some(variants) = read.scorefiles.get(&result.accession) {
            result.n_variants = variants.len();
        }
    }

    let mut report = check(&results, config.min_overlap, config.policy)?;
    report.errors.extend(lift_errors);

    fs::create_dir_all(outdir)?;

    let log = MatchLog {
        scorefiles: Some(&read.scorefiles),
        qc: Some(&read.qc),
        liftover: &liftover_records,
        results: Some(&results),
        summaries: &report.summaries,
    };
    let log_path = outdir.join(format!("{}_{}", dataset, LOG_SUFFIX));
    write_log(&log_path, &log.rows())?;

    let summary_path = outdir.join(format!("{}_{}", dataset, SUMMARY_SUFFIX));
    write_summary(
        &summary_path,
        &RunSummary {
            dataset,
            qc: &read.qc.accessions,
            accessions: &report.summaries,
            errors: report.errors.iter().map(|e| e.to_string()).collect(),
        },
    )?;

    let passed = results
        .into_values()
        .filter(|r| report.is_pass(&r.accession))
        .flat_map(|r| r.matches)
        .collect();
    let tables = build_tables(passed);

    let options = WriterOptions {
        dataset: dataset.to_string(),
        split_chromosomes: config.split_chromosomes,
        compress: config.compress,
    };
    let scorefiles = write_tables(outdir, &tables, &options)?;

    Ok(PipelineOutput {
        scorefiles,
        log: log_path,
        summary: summary_path,
        report,
    })
}
