// scorefile column names
pub const CHR_NAME: &str = "chr_name";
pub const CHR_POSITION: &str = "chr_position";
pub const EFFECT_ALLELE: &str = "effect_allele";
pub const OTHER_ALLELE: &str = "other_allele";
pub const EFFECT_WEIGHT: &str = "effect_weight";
pub const EFFECT_WEIGHT_PREFIX: &str = "effect_weight_";
pub const IS_DOMINANT: &str = "is_dominant";
pub const IS_RECESSIVE: &str = "is_recessive";

/// Header metadata key declaring the build of the scorefile coordinates.
pub const GENOME_BUILD_KEY: &str = "genome_build";

// output
pub const SCOREFILE_EXT: &str = "scorefile";
pub const ALL_CHROMOSOMES: &str = "ALL";
pub const ID_COLUMN: &str = "ID";
pub const MISSING_WEIGHT: &str = "0";
