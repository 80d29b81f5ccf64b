use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Genetic model applied to the dosage of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectType {
    Additive,
    Dominant,
    Recessive,
}

impl EffectType {
    ///
    /// Derive the effect type from the optional dominance indicator columns.
    ///
    /// Returns `None` when both indicators are set, which is never a valid model.
    ///
    pub fn from_indicators(is_dominant: bool, is_recessive: bool) -> Option<Self> {
        match (is_dominant, is_recessive) {
            (true, true) => None,
            (true, false) => Some(EffectType::Dominant),
            (false, true) => Some(EffectType::Recessive),
            (false, false) => Some(EffectType::Additive),
        }
    }
}

impl Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectType::Additive => "additive",
            EffectType::Dominant => "dominant",
            EffectType::Recessive => "recessive",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EffectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "additive" => Ok(EffectType::Additive),
            "dominant" => Ok(EffectType::Dominant),
            "recessive" => Ok(EffectType::Recessive),
            _ => Err(format!("Invalid effect type: {}", s)),
        }
    }
}

///
/// A single scored variant read from a scorefile, after quality control.
///
/// `line` is the line number in the source file. Together with `accession` it
/// identifies the variant through liftover, matching and logging.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreVariant {
    pub chr: String,
    pub pos: u64,
    pub effect_allele: String,
    pub other_allele: Option<String>,
    pub effect_weight: f64,
    pub effect_type: EffectType,
    pub accession: String,
    pub line: usize,
}

impl ScoreVariant {
    pub fn has_other_allele(&self) -> bool {
        self.other_allele.is_some()
    }

    /// Key used to enforce uniqueness within an accession.
    pub fn key(&self) -> (&str, u64, &str, Option<&str>) {
        (
            self.chr.as_str(),
            self.pos,
            self.effect_allele.as_str(),
            self.other_allele.as_deref(),
        )
    }
}
