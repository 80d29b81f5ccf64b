use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pgsc_core::models::GenomeBuild;

use crate::consts::*;
use crate::report::ReportPolicy;

#[derive(Error, Debug)]
pub enum MatchConfigError {
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("Liftover to {0} needs a chain_dir")]
    MissingChainDir(GenomeBuild),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type MatchConfigResult<T> = std::result::Result<T, MatchConfigError>;

fn default_min_overlap() -> f64 {
    DEFAULT_MIN_OVERLAP
}

fn default_min_liftover() -> f64 {
    DEFAULT_MIN_LIFTOVER
}

fn default_remove_ambiguous() -> bool {
    DEFAULT_REMOVE_AMBIGUOUS
}

fn default_remove_multiallelic() -> bool {
    DEFAULT_REMOVE_MULTIALLELIC
}

///
/// Settings for a matching run. Every field has a default, so an empty TOML
/// file is a valid config.
///
/// ```toml
/// min_overlap = 0.75
/// remove_ambiguous = true
/// target_build = "GRCh38"
/// chain_dir = "chains/"
/// policy = "skip_failing"
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MatchConfig {
    #[serde(default = "default_min_overlap")]
    pub min_overlap: f64,
    #[serde(default = "default_remove_ambiguous")]
    pub remove_ambiguous: bool,
    #[serde(default = "default_remove_multiallelic")]
    pub remove_multiallelic: bool,
    #[serde(default = "default_min_liftover")]
    pub min_liftover: f64,
    /// liftover is requested when a target build is set
    #[serde(default)]
    pub target_build: Option<GenomeBuild>,
    #[serde(default)]
    pub chain_dir: Option<PathBuf>,
    #[serde(default)]
    pub split_chromosomes: bool,
    #[serde(default)]
    pub policy: ReportPolicy,
    #[serde(default)]
    pub compress: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            min_overlap: DEFAULT_MIN_OVERLAP,
            remove_ambiguous: DEFAULT_REMOVE_AMBIGUOUS,
            remove_multiallelic: DEFAULT_REMOVE_MULTIALLELIC,
            min_liftover: DEFAULT_MIN_LIFTOVER,
            target_build: None,
            chain_dir: None,
            split_chromosomes: false,
            policy: ReportPolicy::default(),
            compress: false,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> MatchConfigResult<()> {
        for (name, value) in [("min_overlap", self.min_overlap), ("min_liftover", self.min_liftover)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchConfigError::InvalidThreshold { name, value });
            }
        }
        if let (Some(build), None) = (self.target_build, &self.chain_dir) {
            return Err(MatchConfigError::MissingChainDir(build));
        }
        Ok(())
    }

    pub fn liftover_requested(&self) -> bool {
        self.target_build.is_some()
    }
}

impl TryFrom<&Path> for MatchConfig {
    type Error = MatchConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: MatchConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[rstest]
    fn test_empty_config_is_default() {
        let (_dir, path) = write_config("");
        let config = MatchConfig::try_from(path.as_path()).unwrap();
        assert_eq!(config, MatchConfig::default());
        assert!(!config.liftover_requested());
    }

    #[rstest]
    fn test_try_from_toml() {
        let (_dir, path) = write_config(
            "min_overlap = 0.9\nremove_ambiguous = false\ntarget_build = \"hg19\"\nchain_dir = \"chains\"\npolicy = \"skip_failing\"\n",
        );
        let config = MatchConfig::try_from(path.as_path()).unwrap();
        assert_eq!(config.min_overlap, 0.9);
        assert!(!config.remove_ambiguous);
        assert_eq!(config.target_build, Some(GenomeBuild::GRCh37));
        assert_eq!(config.chain_dir, Some(PathBuf::from("chains")));
        assert_eq!(config.policy, ReportPolicy::SkipFailing);
        assert!(config.liftover_requested());
    }

    #[rstest]
    #[case("min_overlap = 1.5\n")]
    #[case("min_liftover = -0.1\n")]
    #[case("target_build = \"GRCh38\"\n")]
    fn test_invalid_config(#[case] contents: &str) {
        let (_dir, path) = write_config(contents);
        assert!(MatchConfig::try_from(path.as_path()).is_err());
    }

    #[rstest]
    fn test_unknown_build_is_rejected() {
        let (_dir, path) = write_config("target_build = \"hg17\"\nchain_dir = \"c\"\n");
        assert!(matches!(
            MatchConfig::try_from(path.as_path()),
            Err(MatchConfigError::Toml(_))
        ));
    }
}
