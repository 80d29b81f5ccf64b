/// Effect alleles coding presence/absence (e.g. HLA alleles) rather than nucleotides.
pub const PRESENCE_ABSENCE_ALLELES: [&str; 2] = ["P", "N"];

pub const CHR_PREFIX: &str = "chr";
