//! Write matched variants as wide scoring tables, one per effect type and subset.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use fxhash::FxHashMap;
use log::info;

use pgsc_core::Result;
use pgsc_core::models::{EffectType, MatchRecord};
use pgsc_core::utils::normalize_chrom;

use crate::consts::{ALL_CHROMOSOMES, EFFECT_ALLELE, ID_COLUMN, MISSING_WEIGHT, SCOREFILE_EXT};

#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub dataset: String,
    pub split_chromosomes: bool,
    pub compress: bool,
}

impl WriterOptions {
    pub fn new(dataset: &str) -> Self {
        WriterOptions {
            dataset: dataset.to_string(),
            split_chromosomes: false,
            compress: false,
        }
    }

    ///
    /// `<dataset>_<chrom|ALL>_<effect_type>_<subset>.scorefile[.gz]`
    ///
    pub fn file_name(&self, chrom: &str, effect_type: EffectType, subset: usize) -> String {
        let mut name = format!(
            "{}_{}_{}_{}.{}",
            self.dataset, chrom, effect_type, subset, SCOREFILE_EXT
        );
        if self.compress {
            name.push_str(".gz");
        }
        name
    }
}

/// Autosomes sort numerically, then everything else by name (X, Y, MT, ...).
fn chrom_sort_key(chr: &str) -> (u8, u64, String) {
    match chr.parse::<u64>() {
        Ok(n) => (0, n, String::new()),
        Err(_) => (1, 0, chr.to_string()),
    }
}

#[derive(Debug)]
struct WideRow<'a> {
    id: &'a str,
    effect_allele: String,
    weights: FxHashMap<&'a str, f64>,
}

type RowKey = ((u8, u64, String), u64, String, String);

///
/// Pivot one table to one row per (identifier, effect allele), grouping rows
/// by chromosome when requested.
///
fn pivot<'a>(records: &'a [MatchRecord], split: bool) -> BTreeMap<String, BTreeMap<RowKey, WideRow<'a>>> {
    let mut chroms: BTreeMap<String, BTreeMap<RowKey, WideRow<'a>>> = BTreeMap::new();

    for record in records {
        let chr = normalize_chrom(&record.target.chr);
        let effect_allele = record.target_effect_allele();
        let group = match split {
            true => chr.to_string(),
            false => ALL_CHROMOSOMES.to_string(),
        };
        let key: RowKey = (
            chrom_sort_key(chr),
            record.target.pos,
            record.id().to_string(),
            effect_allele.clone(),
        );

        chroms
            .entry(group)
            .or_default()
            .entry(key)
            .or_insert_with(|| WideRow {
                id: record.id(),
                effect_allele,
                weights: FxHashMap::default(),
            })
            .weights
            .entry(record.accession())
            .or_insert(record.variant.effect_weight);
    }

    chroms
}

fn open_writer(path: &Path, compress: bool) -> Result<Box<dyn Write>> {
    let file = BufWriter::new(File::create(path)?);
    let writer: Box<dyn Write> = match compress {
        true => Box::new(GzEncoder::new(file, Compression::default())),
        false => Box::new(file),
    };
    Ok(writer)
}

///
/// Write every (effect type, subset) table to `outdir`.
///
/// All files share the same weight columns: every accession present in any
/// table, in sorted order, with `0` where an accession has no weight for a row.
///
/// # Arguments
/// - outdir: output directory, created if missing
/// - tables: unduplicated matches keyed by effect type and subset index
/// - options: naming, splitting and compression
///
pub fn write_tables(
    outdir: &Path,
    tables: &BTreeMap<(EffectType, usize), Vec<MatchRecord>>,
    options: &WriterOptions,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(outdir)?;

    let accessions: BTreeSet<&str> = tables
        .values()
        .flatten()
        .map(|record| record.accession())
        .collect();

    let mut header: Vec<&str> = vec![ID_COLUMN, EFFECT_ALLELE];
    header.extend(accessions.iter().copied());

    let mut written = Vec::new();

    for ((effect_type, subset), records) in tables {
        if records.is_empty() {
            continue;
        }

        for (chrom, rows) in pivot(records, options.split_chromosomes) {
            let path = outdir.join(options.file_name(&chrom, *effect_type, *subset));
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(open_writer(&path, options.compress)?);

            writer.write_record(&header)?;
            for row in rows.values() {
                let mut fields: Vec<String> = vec![row.id.to_string(), row.effect_allele.clone()];
                fields.extend(accessions.iter().map(|accession| {
                    row.weights
                        .get(accession)
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| MISSING_WEIGHT.to_string())
                }));
                writer.write_record(&fields)?;
            }
            writer.flush()?;

            info!("Wrote {} variants to {}", rows.len(), path.display());
            written.push(path);
        }
    }

    Ok(written)
}
