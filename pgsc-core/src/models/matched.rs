use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::models::{ScoreVariant, TargetVariant};
use crate::utils::complement;

///
/// The orientation hypothesis under which a scorefile variant joined a target variant.
///
/// The `NoOa*` hypotheses are used for scorefile variants without an other allele,
/// which can only be matched on the effect allele.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    RefAlt,
    AltRef,
    RefAltFlipped,
    AltRefFlipped,
    NoOaRef,
    NoOaAlt,
    NoOaRefFlipped,
    NoOaAltFlipped,
}

impl MatchType {
    pub const WITH_OTHER_ALLELE: [MatchType; 4] = [
        MatchType::RefAlt,
        MatchType::AltRef,
        MatchType::RefAltFlipped,
        MatchType::AltRefFlipped,
    ];

    pub const EFFECT_ALLELE_ONLY: [MatchType; 4] = [
        MatchType::NoOaRef,
        MatchType::NoOaAlt,
        MatchType::NoOaRefFlipped,
        MatchType::NoOaAltFlipped,
    ];

    /// True when the scorefile alleles were complemented to join the target.
    pub fn is_flipped(&self) -> bool {
        matches!(
            self,
            MatchType::RefAltFlipped
                | MatchType::AltRefFlipped
                | MatchType::NoOaRefFlipped
                | MatchType::NoOaAltFlipped
        )
    }

    /// Lower ranks win when one variant matched under several hypotheses.
    pub fn rank(&self) -> u8 {
        match self {
            MatchType::RefAlt | MatchType::NoOaRef => 0,
            MatchType::AltRef | MatchType::NoOaAlt => 1,
            MatchType::RefAltFlipped | MatchType::NoOaRefFlipped => 2,
            MatchType::AltRefFlipped | MatchType::NoOaAltFlipped => 3,
        }
    }
}

impl Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchType::RefAlt => "ref_alt",
            MatchType::AltRef => "alt_ref",
            MatchType::RefAltFlipped => "ref_alt_flipped",
            MatchType::AltRefFlipped => "alt_ref_flipped",
            MatchType::NoOaRef => "no_oa_ref",
            MatchType::NoOaAlt => "no_oa_alt",
            MatchType::NoOaRefFlipped => "no_oa_ref_flipped",
            MatchType::NoOaAltFlipped => "no_oa_alt_flipped",
        };
        write!(f, "{}", s)
    }
}

///
/// A scorefile variant joined to a target variant under one orientation hypothesis.
///
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub variant: ScoreVariant,
    pub target: TargetVariant,
    pub match_type: MatchType,
    pub ambiguous: bool,
}

impl MatchRecord {
    pub fn accession(&self) -> &str {
        &self.variant.accession
    }

    pub fn id(&self) -> &str {
        &self.target.id
    }

    ///
    /// The effect allele expressed on the target strand. Flipped matches report the
    /// complemented scorefile allele so dosage is counted against the right target allele.
    ///
    pub fn target_effect_allele(&self) -> String {
        if self.match_type.is_flipped() {
            complement(&self.variant.effect_allele)
                .unwrap_or_else(|| self.variant.effect_allele.clone())
        } else {
            self.variant.effect_allele.clone()
        }
    }
}
