//! Split matches into tables where every target identifier has one effect allele.

use std::collections::BTreeMap;

use fxhash::{FxHashMap, FxHashSet};
use log::info;

use pgsc_core::models::{EffectType, MatchRecord};

#[derive(Debug, Default)]
struct Subset<'a> {
    /// identifier -> (effect allele on the target strand, accessions using it)
    ids: FxHashMap<String, (String, FxHashSet<&'a str>)>,
    records: Vec<MatchRecord>,
}

impl<'a> Subset<'a> {
    fn accepts(&self, id: &str, effect_allele: &str, accession: &str) -> bool {
        match self.ids.get(id) {
            None => true,
            Some((allele, accessions)) => allele == effect_allele && !accessions.contains(accession),
        }
    }
}

///
/// Split matches sharing a target identifier but carrying different effect
/// alleles into parallel subsets.
///
/// Each match goes to the first subset where its identifier is unused, or used
/// with the same effect allele by other accessions only. Within one subset each
/// identifier has exactly one effect allele, and no subset is missing a match:
/// the subset sizes sum to the input size.
///
pub fn unduplicate(matches: &[MatchRecord]) -> Vec<Vec<MatchRecord>> {
    let mut subsets: Vec<Subset<'_>> = Vec::new();

    for record in matches {
        let effect_allele = record.target_effect_allele();
        let accession = record.accession();

        let idx = match subsets
            .iter()
            .position(|s| s.accepts(record.id(), &effect_allele, accession))
        {
            Some(idx) => idx,
            None => {
                subsets.push(Subset::default());
                subsets.len() - 1
            }
        };

        let subset = &mut subsets[idx];
        subset
            .ids
            .entry(record.id().to_string())
            .or_insert_with(|| (effect_allele, FxHashSet::default()))
            .1
            .insert(accession);
        subset.records.push(record.clone());
    }

    if subsets.len() > 1 {
        info!(
            "Duplicated identifiers with different effect alleles, split matches into {} subsets",
            subsets.len()
        );
    }

    subsets.into_iter().map(|s| s.records).collect()
}

///
/// Group matches by the genetic model applied to their dosage.
///
pub fn split_effect_type(matches: Vec<MatchRecord>) -> BTreeMap<EffectType, Vec<MatchRecord>> {
    let mut split: BTreeMap<EffectType, Vec<MatchRecord>> = BTreeMap::new();
    for record in matches {
        split
            .entry(record.variant.effect_type)
            .or_default()
            .push(record);
    }
    split
}

///
/// Build the output tables keyed by (effect type, subset index).
///
pub fn build_tables(matches: Vec<MatchRecord>) -> BTreeMap<(EffectType, usize), Vec<MatchRecord>> {
    let mut tables = BTreeMap::new();
    for (effect_type, records) in split_effect_type(matches) {
        for (subset, records) in unduplicate(&records).into_iter().enumerate() {
            tables.insert((effect_type, subset), records);
        }
    }
    tables
}
