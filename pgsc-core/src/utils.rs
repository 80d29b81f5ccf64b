use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::consts::CHR_PREFIX;
use crate::errors::Result;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    let reader = BufReader::new(file);

    Ok(reader)
}

///
/// Accession of a scorefile: the file name up to the first `.`,
/// e.g. `PGS000802.txt.gz` -> `PGS000802`.
///
pub fn accession_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

fn complement_base(base: char) -> Option<char> {
    match base {
        'A' => Some('T'),
        'T' => Some('A'),
        'C' => Some('G'),
        'G' => Some('C'),
        _ => None,
    }
}

///
/// Base-wise complement of an allele, keeping base order (no reversal).
///
/// Returns `None` if the allele contains anything other than A, C, G or T.
///
pub fn complement(allele: &str) -> Option<String> {
    if allele.is_empty() {
        return None;
    }
    allele.chars().map(complement_base).collect()
}

///
/// True when an allele pair can't be oriented from the alleles alone,
/// i.e. one allele is the complement of the other (A/T, C/G).
///
pub fn is_strand_ambiguous(a: &str, b: &str) -> bool {
    complement(a).is_some_and(|c| c == b)
}

///
/// Chromosome label used to compare datasets: a leading `chr` is dropped
/// so `chr22` and `22` compare equal.
///
pub fn normalize_chrom(chr: &str) -> &str {
    chr.strip_prefix(CHR_PREFIX).unwrap_or(chr)
}

///
/// Chromosome label returned by a chain may carry a scaffold annotation
/// (`chr22_KI270879v1_alt`). Keep the primary chromosome only.
///
pub fn parse_lifted_chrom(chr: &str) -> Option<String> {
    let chr = normalize_chrom(chr);
    let primary = chr.split('_').next().unwrap_or(chr);
    if primary.is_empty() {
        None
    } else {
        Some(primary.to_string())
    }
}

///
/// Parse a boolean indicator column. Empty and missing values are false.
///
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" | "" | "na" | "nan" => Some(false),
        _ => None,
    }
}
