use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiftStatus {
    Mapped,
    Unmapped,
    /// Source and target builds are the same, coordinates were passed through.
    NotApplicable,
}

///
/// Outcome of converting one scorefile variant between genome builds.
/// Positions are 1-based.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftoverRecord {
    pub accession: String,
    pub line: usize,
    pub original_chr: String,
    pub original_pos: u64,
    pub lifted_chr: Option<String>,
    pub lifted_pos: Option<u64>,
    pub status: LiftStatus,
}

impl LiftoverRecord {
    /// `None` when liftover was not applicable.
    pub fn success(&self) -> Option<bool> {
        match self.status {
            LiftStatus::Mapped => Some(true),
            LiftStatus::Unmapped => Some(false),
            LiftStatus::NotApplicable => None,
        }
    }
}
