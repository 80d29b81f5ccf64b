use serde::{Deserialize, Serialize};

///
/// A genotyped variant in the target data.
///
/// `alt_allele` may hold several comma-joined alleles as read from disk. Use
/// [TargetVariant::explode] to split it into one biallelic record per alt.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetVariant {
    pub chr: String,
    pub pos: u64,
    pub id: String,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl TargetVariant {
    pub fn is_multiallelic(&self) -> bool {
        self.alt_allele.contains(',')
    }

    ///
    /// Split a multi-allelic record into one record per (ref, alt) pair. Each
    /// record keeps the original identifier.
    ///
    pub fn explode(&self) -> Vec<TargetVariant> {
        self.alt_allele
            .split(',')
            .map(|alt| TargetVariant {
                chr: self.chr.clone(),
                pos: self.pos,
                id: self.id.clone(),
                ref_allele: self.ref_allele.clone(),
                alt_allele: alt.to_string(),
            })
            .collect()
    }
}
