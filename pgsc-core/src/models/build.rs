use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PgscError;

///
/// Human reference genome builds supported by scorefiles and target data.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GenomeBuild {
    GRCh37,
    GRCh38,
}

impl GenomeBuild {
    /// UCSC name of the build, used by chain file names.
    pub fn ucsc_name(&self) -> &'static str {
        match self {
            GenomeBuild::GRCh37 => "hg19",
            GenomeBuild::GRCh38 => "hg38",
        }
    }

    ///
    /// File name of the UCSC chain that converts coordinates from `self` to `to`,
    /// e.g. `hg19ToHg38.over.chain.gz`.
    ///
    pub fn chain_file_name(&self, to: GenomeBuild) -> String {
        let to = to.ucsc_name();
        let mut capitalised = to.chars();
        let to = match capitalised.next() {
            Some(first) => first.to_uppercase().chain(capitalised).collect::<String>(),
            None => String::new(),
        };
        format!("{}To{}.over.chain.gz", self.ucsc_name(), to)
    }
}

impl FromStr for GenomeBuild {
    type Err = PgscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grch37" | "hg19" | "37" => Ok(GenomeBuild::GRCh37),
            "grch38" | "hg38" | "38" => Ok(GenomeBuild::GRCh38),
            _ => Err(PgscError::UnknownBuild(s.to_string())),
        }
    }
}

impl TryFrom<String> for GenomeBuild {
    type Error = PgscError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GenomeBuild::from_str(&value)
    }
}

impl From<GenomeBuild> for String {
    fn from(value: GenomeBuild) -> Self {
        value.to_string()
    }
}

impl Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenomeBuild::GRCh37 => write!(f, "GRCh37"),
            GenomeBuild::GRCh38 => write!(f, "GRCh38"),
        }
    }
}
