//! Read PGS Catalog style scoring files into per-accession variant sets.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::info;

use pgsc_core::models::{EffectType, GenomeBuild, ScoreVariant};
use pgsc_core::utils::{accession_from_path, get_dynamic_reader, parse_flag};
use pgsc_core::{PgscError, Result};

use crate::consts::*;
use crate::qc::{QcSummary, RawVariant, quality_control};

///
/// The contents of one scoring file after quality control.
///
/// A file with several `effect_weight_<suffix>` columns holds one accession per
/// suffix, named `<accession>_<suffix>`.
///
#[derive(Debug, Clone)]
pub struct ScorefileSet {
    pub path: PathBuf,
    pub genome_build: Option<GenomeBuild>,
    pub scorefiles: BTreeMap<String, Vec<ScoreVariant>>,
    pub qc: QcSummary,
}

impl ScorefileSet {
    pub fn n_variants(&self) -> usize {
        self.scorefiles.values().map(|v| v.len()).sum()
    }
}

/// Column layout of a scorefile, resolved from its header.
#[derive(Debug, Clone)]
struct Columns {
    chr: usize,
    pos: usize,
    effect_allele: usize,
    other_allele: Option<usize>,
    is_dominant: Option<usize>,
    is_recessive: Option<usize>,
    /// (accession suffix, column index), suffix is `None` for a single weight column
    weights: Vec<(Option<String>, usize)>,
}

impl Columns {
    fn from_header(header: &StringRecord, path: &Path) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h == name);

        let mut missing: Vec<&str> = [CHR_NAME, CHR_POSITION, EFFECT_ALLELE]
            .into_iter()
            .filter(|name| find(name).is_none())
            .collect();

        let weights: Vec<(Option<String>, usize)> = match find(EFFECT_WEIGHT) {
            Some(idx) => vec![(None, idx)],
            None => header
                .iter()
                .enumerate()
                .filter_map(|(idx, h)| {
                    h.strip_prefix(EFFECT_WEIGHT_PREFIX)
                        .filter(|suffix| !suffix.is_empty())
                        .map(|suffix| (Some(suffix.to_string()), idx))
                })
                .collect(),
        };
        if weights.is_empty() {
            missing.push(EFFECT_WEIGHT);
        }

        if !missing.is_empty() {
            return Err(PgscError::Schema {
                path: path.display().to_string(),
                missing: missing.join(", "),
            });
        }

        // the mandatory columns were checked above
        Ok(Columns {
            chr: find(CHR_NAME).unwrap_or_default(),
            pos: find(CHR_POSITION).unwrap_or_default(),
            effect_allele: find(EFFECT_ALLELE).unwrap_or_default(),
            other_allele: find(OTHER_ALLELE),
            is_dominant: find(IS_DOMINANT),
            is_recessive: find(IS_RECESSIVE),
            weights,
        })
    }
}

fn non_missing(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("na"))
        .map(String::from)
}

fn parse_indicator(record: &StringRecord, column: Option<usize>, path: &Path, line: usize) -> Result<bool> {
    let Some(idx) = column else {
        return Ok(false);
    };
    let value = record.get(idx).unwrap_or_default();
    parse_flag(value).ok_or_else(|| PgscError::Parse {
        path: path.display().to_string(),
        line,
        msg: format!("invalid effect type indicator '{}'", value),
    })
}

///
/// Read the `genome_build` declared in the `#` metadata header of a scorefile.
///
/// Returns `None` if the header doesn't declare a build, or declares one that
/// isn't recognised (e.g. `NR`).
///
pub fn read_build(path: &Path) -> Result<Option<GenomeBuild>> {
    let reader = get_dynamic_reader(path)?;

    for line in reader.lines() {
        let line = line?;
        let Some(meta) = line.strip_prefix('#') else {
            break;
        };
        if let Some((key, value)) = meta.split_once('=') {
            if key.trim() == GENOME_BUILD_KEY {
                return Ok(value.trim().parse::<GenomeBuild>().ok());
            }
        }
    }

    Ok(None)
}

///
/// Liftover needs to know the build of a scorefile.
///
pub fn check_build(accession: &str, build: Option<GenomeBuild>) -> Result<GenomeBuild> {
    build.ok_or_else(|| PgscError::MissingBuild {
        accession: accession.to_string(),
    })
}

///
/// Read a scorefile (plain or gzipped, tab separated) and run quality control.
///
/// # Arguments
/// - path: path to the scorefile
///
pub fn read_scorefile(path: &Path) -> Result<ScorefileSet> {
    let accession = accession_from_path(path);
    let genome_build = read_build(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true)
        .from_reader(get_dynamic_reader(path)?);

    let columns = Columns::from_header(reader.headers()?, path)?;

    let mut raw: Vec<Vec<RawVariant>> = vec![Vec::new(); columns.weights.len()];

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or_default();

        // split accessions of a multi-weight file are additive
        let effect_type = if columns.weights.len() > 1 {
            EffectType::Additive
        } else {
            let is_dominant = parse_indicator(&record, columns.is_dominant, path, line)?;
            let is_recessive = parse_indicator(&record, columns.is_recessive, path, line)?;
            EffectType::from_indicators(is_dominant, is_recessive).ok_or_else(|| {
                PgscError::MutualExclusivity {
                    accession: accession.clone(),
                    line,
                }
            })?
        };

        let chr = non_missing(record.get(columns.chr));
        let pos = non_missing(record.get(columns.pos))
            .and_then(|p| p.parse::<u64>().ok())
            .filter(|p| *p >= 1);
        let effect_allele = non_missing(record.get(columns.effect_allele));
        let other_allele = columns
            .other_allele
            .and_then(|idx| non_missing(record.get(idx)));

        for (rows, (_, idx)) in raw.iter_mut().zip(&columns.weights) {
            let effect_weight = non_missing(record.get(*idx))
                .and_then(|w| w.parse::<f64>().ok())
                .filter(|w| w.is_finite());

            rows.push(RawVariant {
                line,
                chr: chr.clone(),
                pos,
                effect_allele: effect_allele.clone(),
                other_allele: other_allele.clone(),
                effect_weight,
                effect_type,
            });
        }
    }

    let mut scorefiles = BTreeMap::new();
    let mut qc = QcSummary::default();

    for (rows, (suffix, _)) in raw.into_iter().zip(&columns.weights) {
        let name = match suffix {
            Some(suffix) => format!("{}_{}", accession, suffix),
            None => accession.clone(),
        };

        let outcome = quality_control(&name, rows)?;
        info!(
            "{}: {} variants read, {} passed quality control",
            name, outcome.summary.n_rows, outcome.summary.n_pass
        );

        if let Some(variants) = outcome.variants {
            scorefiles.insert(name, variants);
        }
        qc.accessions.push(outcome.summary);
        qc.failures.extend(outcome.failures);
    }

    Ok(ScorefileSet {
        path: path.to_path_buf(),
        genome_build,
        scorefiles,
        qc,
    })
}
