use thiserror::Error;

use crate::models::GenomeBuild;

#[derive(Error, Debug)]
pub enum PgscError {
    #[error("Missing mandatory columns in {path}: {missing}")]
    Schema { path: String, missing: String },

    #[error(
        "{accession}: variant on line {line} is both dominant and recessive (effect types are mutually exclusive)"
    )]
    MutualExclusivity { accession: String, line: usize },

    #[error(
        "{accession}: duplicate variant {chr}:{pos} effect allele {effect_allele}, other allele {other_allele}"
    )]
    DuplicateIdentifier {
        accession: String,
        chr: String,
        pos: u64,
        effect_allele: String,
        other_allele: String,
    },

    #[error(
        "{accession}: liftover {from} -> {to} mapped {mapped}/{total} variants ({rate:.4}), minimum is above {min_success_rate}. Is the scorefile build correct?"
    )]
    LiftoverCoverage {
        accession: String,
        from: GenomeBuild,
        to: GenomeBuild,
        mapped: usize,
        total: usize,
        rate: f64,
        min_success_rate: f64,
    },

    #[error(
        "{accession}: target data overlap poorly with the scorefile. {unmatched}/{total} variants unmatched ({failed_fraction:.4}), minimum overlap is {min_overlap}"
    )]
    MatchRate {
        accession: String,
        unmatched: usize,
        total: usize,
        failed_fraction: f64,
        min_overlap: f64,
    },

    #[error(
        "No variants matched in any of {n_scorefiles} scorefile(s). Check the genome build of the scorefiles and the target data"
    )]
    EmptyMatch { n_scorefiles: usize },

    #[error("{accession}: {matched} matches for {variants} input variants")]
    MatchInflation {
        accession: String,
        matched: usize,
        variants: usize,
    },

    #[error("{accession}: genome build is missing from the scorefile header, can't liftover")]
    MissingBuild { accession: String },

    #[error("Unknown genome build: {0}")]
    UnknownBuild(String),

    #[error("No chain file available for liftover {from} -> {to}")]
    MissingChain { from: GenomeBuild, to: GenomeBuild },

    #[error("Error parsing chain file: {0}")]
    ChainFile(String),

    #[error("Error parsing {path} line {line}: {msg}")]
    Parse {
        path: String,
        line: usize,
        msg: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PgscError>;
