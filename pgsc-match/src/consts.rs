pub const DEFAULT_MIN_OVERLAP: f64 = 0.75;
pub const DEFAULT_MIN_LIFTOVER: f64 = 0.95;
pub const DEFAULT_REMOVE_AMBIGUOUS: bool = true;
pub const DEFAULT_REMOVE_MULTIALLELIC: bool = false;

// target tables
pub const META_PREFIX: &str = "##";
pub const HEADER_PREFIX: &str = "#CHROM";
pub const BIM_N_COLUMNS: usize = 6;
pub const PVAR_CHROM: &str = "#CHROM";
pub const PVAR_POS: &str = "POS";
pub const PVAR_ID: &str = "ID";
pub const PVAR_REF: &str = "REF";
pub const PVAR_ALT: &str = "ALT";
pub const MISSING_ID: &str = ".";

// outputs
pub const SUMMARY_SUFFIX: &str = "summary.json";
pub const LOG_SUFFIX: &str = "log.tsv";
