//! Join scorefile variants to target variants under the orientation hypotheses.

use std::collections::BTreeMap;

use fxhash::FxHashMap;
use log::{debug, info};
use rayon::prelude::*;

use pgsc_core::models::{MatchRecord, MatchType, ScoreVariant, TargetVariant};
use pgsc_core::utils::{complement, is_strand_ambiguous, normalize_chrom};
use pgsc_core::{PgscError, Result};

use crate::target::TargetIndex;

///
/// Matches for one accession.
///
/// `matches` holds at most one record per (chromosome, position, effect allele).
/// `ambiguous_removed` holds the strand ambiguous records dropped because
/// ambiguous matches were not wanted; they count as unmatched.
///
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub accession: String,
    pub n_variants: usize,
    pub matches: Vec<MatchRecord>,
    pub ambiguous_removed: Vec<MatchRecord>,
}

impl MatchResult {
    pub fn n_matched(&self) -> usize {
        self.matches.len()
    }

    pub fn n_unmatched(&self) -> usize {
        self.n_variants.saturating_sub(self.matches.len())
    }

    pub fn n_ambiguous(&self) -> usize {
        self.matches.iter().filter(|m| m.ambiguous).count() + self.ambiguous_removed.len()
    }
}

/// Test one hypothesis for a scorefile variant against one target variant.
fn hypothesis_holds(match_type: MatchType, variant: &ScoreVariant, target: &TargetVariant) -> bool {
    let ea = variant.effect_allele.as_str();
    let oa = variant.other_allele.as_deref();
    let (ref_allele, alt_allele) = (target.ref_allele.as_str(), target.alt_allele.as_str());

    let flipped = |allele: &str, expected: &str| complement(allele).is_some_and(|c| c == expected);

    match (match_type, oa) {
        (MatchType::RefAlt, Some(oa)) => ea == ref_allele && oa == alt_allele,
        (MatchType::AltRef, Some(oa)) => ea == alt_allele && oa == ref_allele,
        (MatchType::RefAltFlipped, Some(oa)) => flipped(ea, ref_allele) && flipped(oa, alt_allele),
        (MatchType::AltRefFlipped, Some(oa)) => flipped(ea, alt_allele) && flipped(oa, ref_allele),
        (MatchType::NoOaRef, None) => ea == ref_allele,
        (MatchType::NoOaAlt, None) => ea == alt_allele,
        (MatchType::NoOaRefFlipped, None) => flipped(ea, ref_allele),
        (MatchType::NoOaAltFlipped, None) => flipped(ea, alt_allele),
        _ => false,
    }
}

///
/// A scorefile variant joined to a target variant, with the position of the
/// variant in the input so the output keeps input order.
///
#[derive(Debug, Clone)]
struct Candidate {
    input_idx: usize,
    record: MatchRecord,
}

///
/// Run every orientation hypothesis as a separate join over the target index
/// and concatenate the results.
///
/// Variants with an other allele use the four two-allele hypotheses, variants
/// without one use the four effect-allele-only hypotheses.
///
pub fn get_all_matches(target: &TargetIndex, variants: &[ScoreVariant]) -> Vec<MatchRecord> {
    all_candidates(target, variants)
        .into_iter()
        .map(|c| c.record)
        .collect()
}

fn all_candidates(target: &TargetIndex, variants: &[ScoreVariant]) -> Vec<Candidate> {
    let (with_oa, without_oa): (Vec<(usize, &ScoreVariant)>, Vec<(usize, &ScoreVariant)>) = variants
        .iter()
        .enumerate()
        .partition(|(_, v)| v.has_other_allele());

    let joins = MatchType::WITH_OTHER_ALLELE
        .into_iter()
        .map(|mt| (mt, &with_oa))
        .chain(MatchType::EFFECT_ALLELE_ONLY.into_iter().map(|mt| (mt, &without_oa)));

    let mut candidates = Vec::new();
    for (match_type, partition) in joins {
        for (input_idx, variant) in partition {
            for site in target.get(&variant.chr, variant.pos) {
                if hypothesis_holds(match_type, variant, site) {
                    candidates.push(Candidate {
                        input_idx: *input_idx,
                        record: MatchRecord {
                            variant: (*variant).clone(),
                            target: site.clone(),
                            match_type,
                            ambiguous: is_strand_ambiguous(&site.ref_allele, &site.alt_allele),
                        },
                    });
                }
            }
        }
    }

    candidates
}

type GroupKey<'a> = (&'a str, &'a str, u64, &'a str);

fn group_key(record: &MatchRecord) -> GroupKey<'_> {
    (
        record.variant.accession.as_str(),
        normalize_chrom(&record.variant.chr),
        record.variant.pos,
        record.variant.effect_allele.as_str(),
    )
}

/// Ordering of candidates within a group, lowest wins.
fn priority(candidate: &Candidate) -> (bool, u8) {
    (candidate.record.ambiguous, candidate.record.match_type.rank())
}

///
/// Keep one representative candidate per (accession, chromosome, position,
/// effect allele): non-ambiguous before ambiguous, then by hypothesis rank,
/// then first seen.
///
fn best_per_group(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut best: FxHashMap<GroupKey<'_>, usize> = FxHashMap::default();

    for (idx, candidate) in candidates.iter().enumerate() {
        best.entry(group_key(&candidate.record))
            .and_modify(|current| {
                if priority(candidate) < priority(&candidates[*current]) {
                    *current = idx;
                }
            })
            .or_insert(idx);
    }

    let mut keep: Vec<usize> = best.into_values().collect();
    keep.sort_unstable();

    let mut kept: Vec<Candidate> = Vec::with_capacity(keep.len());
    let mut keep = keep.into_iter().peekable();
    for (idx, candidate) in candidates.into_iter().enumerate() {
        if keep.peek() == Some(&idx) {
            keep.next();
            kept.push(candidate);
        }
    }

    kept.sort_by_key(|c| c.input_idx);
    kept
}

///
/// A match can only consume input variants, never multiply them.
///
pub fn check_match_inflation(accession: &str, n_matched: usize, n_variants: usize) -> Result<()> {
    if n_matched > n_variants {
        return Err(PgscError::MatchInflation {
            accession: accession.to_string(),
            matched: n_matched,
            variants: n_variants,
        });
    }
    Ok(())
}

///
/// Match the variants of one accession against the target.
///
/// # Arguments
/// - accession: scorefile accession
/// - target: indexed target variants
/// - variants: scorefile variants of this accession
/// - remove_ambiguous: drop strand ambiguous matches instead of keeping them
///   under their best hypothesis
///
pub fn match_variants(
    accession: &str,
    target: &TargetIndex,
    variants: &[ScoreVariant],
    remove_ambiguous: bool,
) -> Result<MatchResult> {
    let candidates = all_candidates(target, variants);
    let n_candidates = candidates.len();

    let (ambiguous, matches): (Vec<MatchRecord>, Vec<MatchRecord>) = best_per_group(candidates)
        .into_iter()
        .map(|c| c.record)
        .partition(|record| remove_ambiguous && record.ambiguous);

    debug!(
        "{}: {} candidate matches, {} kept, {} ambiguous removed",
        accession,
        n_candidates,
        matches.len(),
        ambiguous.len()
    );

    check_match_inflation(accession, matches.len(), variants.len())?;

    info!(
        "{}: matched {}/{} variants",
        accession,
        matches.len(),
        variants.len()
    );

    Ok(MatchResult {
        accession: accession.to_string(),
        n_variants: variants.len(),
        matches,
        ambiguous_removed: ambiguous,
    })
}

///
/// Match every accession against the same target, in parallel.
///
/// Results are returned in accession order. Zero matches across all
/// accessions is an error: the builds most likely differ, or the datasets
/// don't overlap at all.
///
pub fn match_scorefiles(
    target: &TargetIndex,
    scorefiles: &BTreeMap<String, Vec<ScoreVariant>>,
    remove_ambiguous: bool,
) -> Result<BTreeMap<String, MatchResult>> {
    let results: Vec<MatchResult> = scorefiles
        .par_iter()
        .map(|(accession, variants)| match_variants(accession, target, variants, remove_ambiguous))
        .collect::<Result<Vec<_>>>()?;

    if results.iter().all(|r| r.matches.is_empty()) {
        return Err(PgscError::EmptyMatch {
            n_scorefiles: scorefiles.len(),
        });
    }

    Ok(results
        .into_iter()
        .map(|r| (r.accession.clone(), r))
        .collect())
}
