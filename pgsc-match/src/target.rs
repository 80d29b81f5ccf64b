//! Target genotype variant tables: PLINK `.bim` and `.pvar` / VCF-like tables.

use std::io::BufRead;
use std::path::Path;

use fxhash::FxHashMap;
use log::{debug, info};

use pgsc_core::models::TargetVariant;
use pgsc_core::utils::{get_dynamic_reader, normalize_chrom};
use pgsc_core::{PgscError, Result};

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// 6 positional columns: chrom, id, cm, pos, ref, alt
    Bim,
    /// header-bearing table with at least `#CHROM, POS, ID, REF, ALT`
    Pvar,
}

impl TargetFormat {
    ///
    /// Detect the format from the first line that isn't a `##` meta line.
    ///
    pub fn detect(first_line: &str) -> Self {
        if first_line.starts_with(HEADER_PREFIX) {
            TargetFormat::Pvar
        } else {
            TargetFormat::Bim
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PvarColumns {
    chr: usize,
    pos: usize,
    id: usize,
    ref_allele: usize,
    alt_allele: usize,
}

impl PvarColumns {
    fn from_header(header: &str, path: &Path) -> Result<Self> {
        let fields: Vec<&str> = header.split('\t').map(str::trim).collect();
        let find = |name: &str| fields.iter().position(|f| *f == name);

        match (
            find(PVAR_CHROM),
            find(PVAR_POS),
            find(PVAR_ID),
            find(PVAR_REF),
            find(PVAR_ALT),
        ) {
            (Some(chr), Some(pos), Some(id), Some(ref_allele), Some(alt_allele)) => Ok(PvarColumns {
                chr,
                pos,
                id,
                ref_allele,
                alt_allele,
            }),
            _ => {
                let missing: Vec<&str> = [PVAR_CHROM, PVAR_POS, PVAR_ID, PVAR_REF, PVAR_ALT]
                    .into_iter()
                    .filter(|name| find(name).is_none())
                    .collect();
                Err(PgscError::Schema {
                    path: path.display().to_string(),
                    missing: missing.join(", "),
                })
            }
        }
    }
}

fn parse_error(path: &Path, line: usize, msg: impl Into<String>) -> PgscError {
    PgscError::Parse {
        path: path.display().to_string(),
        line,
        msg: msg.into(),
    }
}

fn build_variant(chr: &str, pos: &str, id: &str, ref_allele: &str, alt_allele: &str, path: &Path, line: usize) -> Result<TargetVariant> {
    let pos = pos
        .parse::<u64>()
        .map_err(|_| parse_error(path, line, format!("invalid position '{}'", pos)))?;

    let id = if id.is_empty() || id == MISSING_ID {
        format!("{}:{}:{}:{}", chr, pos, ref_allele, alt_allele)
    } else {
        id.to_string()
    };

    Ok(TargetVariant {
        chr: chr.to_string(),
        pos,
        id,
        ref_allele: ref_allele.to_string(),
        alt_allele: alt_allele.to_string(),
    })
}

///
/// Read a target variant table (plain or gzipped). The format is detected from
/// the content, not the file extension.
///
/// # Arguments
/// - path: path to a `.bim` or `.pvar` file
///
pub fn read_target(path: &Path) -> Result<Vec<TargetVariant>> {
    let reader = get_dynamic_reader(path)?;

    let mut variants = Vec::new();
    let mut format: Option<TargetFormat> = None;
    let mut pvar_columns: Option<PvarColumns> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        // CRLF files
        let line = line.trim_end_matches('\r');
        let line_no = idx + 1;

        if line.starts_with(META_PREFIX) || line.trim().is_empty() {
            continue;
        }

        let current = match format {
            Some(format) => format,
            None => {
                let detected = TargetFormat::detect(&line);
                debug!("{}: detected {:?} target format", path.display(), detected);
                format = Some(detected);
                if detected == TargetFormat::Pvar {
                    pvar_columns = Some(PvarColumns::from_header(&line, path)?);
                    continue;
                }
                detected
            }
        };

        let variant = match (current, pvar_columns) {
            (TargetFormat::Pvar, Some(cols)) => {
                let fields: Vec<&str> = line.split('\t').collect();
                let get = |i: usize| {
                    fields
                        .get(i)
                        .copied()
                        .ok_or_else(|| parse_error(path, line_no, "too few columns"))
                };
                build_variant(
                    get(cols.chr)?,
                    get(cols.pos)?,
                    get(cols.id)?,
                    get(cols.ref_allele)?,
                    get(cols.alt_allele)?,
                    path,
                    line_no,
                )?
            }
            _ => {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < BIM_N_COLUMNS {
                    return Err(parse_error(
                        path,
                        line_no,
                        format!("expected {} columns, found {}", BIM_N_COLUMNS, fields.len()),
                    ));
                }
                build_variant(fields[0], fields[3], fields[1], fields[4], fields[5], path, line_no)?
            }
        };

        variants.push(variant);
    }

    info!("Read {} target variants from {}", variants.len(), path.display());

    Ok(variants)
}

///
/// Target variants indexed by (chromosome, position) for the matching joins.
///
/// Multi-allelic records are exploded into biallelic records keeping their
/// identifier, or dropped entirely when `remove_multiallelic` is set.
///
#[derive(Debug, Default)]
pub struct TargetIndex {
    sites: FxHashMap<(String, u64), Vec<TargetVariant>>,
    n_variants: usize,
    n_multiallelic: usize,
}

impl TargetIndex {
    pub fn new(targets: impl IntoIterator<Item = TargetVariant>, remove_multiallelic: bool) -> Self {
        let mut index = TargetIndex::default();

        for target in targets {
            if target.is_multiallelic() {
                index.n_multiallelic += 1;
                if remove_multiallelic {
                    continue;
                }
                for exploded in target.explode() {
                    index.insert(exploded);
                }
            } else {
                index.insert(target);
            }
        }

        if index.n_multiallelic > 0 {
            info!(
                "{} multi-allelic target variants {}",
                index.n_multiallelic,
                if remove_multiallelic { "removed" } else { "split" }
            );
        }

        index
    }

    ///
    /// Read and index one or more target tables, e.g. one per chromosome.
    ///
    pub fn from_paths<P: AsRef<Path>>(paths: &[P], remove_multiallelic: bool) -> Result<Self> {
        let mut targets = Vec::new();
        for path in paths {
            targets.extend(read_target(path.as_ref())?);
        }
        Ok(TargetIndex::new(targets, remove_multiallelic))
    }

    fn insert(&mut self, target: TargetVariant) {
        let key = (normalize_chrom(&target.chr).to_string(), target.pos);
        self.sites.entry(key).or_default().push(target);
        self.n_variants += 1;
    }

    /// Target variants at a site, in input order.
    pub fn get(&self, chr: &str, pos: u64) -> &[TargetVariant] {
        self.sites
            .get(&(normalize_chrom(chr).to_string(), pos))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.n_variants
    }

    pub fn is_empty(&self) -> bool {
        self.n_variants == 0
    }

    pub fn n_multiallelic(&self) -> usize {
        self.n_multiallelic
    }
}
