use std::path::Path;

use fxhash::FxHashMap;
use log::{debug, info};

use pgsc_core::consts::CHR_PREFIX;
use pgsc_core::models::{GenomeBuild, LiftStatus, LiftoverRecord, ScoreVariant};
use pgsc_core::utils::parse_lifted_chrom;
use pgsc_core::{PgscError, Result};

use crate::chain::ChainFile;

///
/// Scorefile variants partitioned by liftover success, plus one
/// [LiftoverRecord] per input variant.
///
#[derive(Debug, Clone, Default)]
pub struct LiftoverOutcome {
    pub mapped: Vec<ScoreVariant>,
    pub unmapped: Vec<ScoreVariant>,
    pub records: Vec<LiftoverRecord>,
}

impl LiftoverOutcome {
    pub fn total(&self) -> usize {
        self.mapped.len() + self.unmapped.len()
    }

    pub fn mapped_rate(&self) -> f64 {
        match self.total() {
            0 => 1.0,
            n => self.mapped.len() as f64 / n as f64,
        }
    }
}

///
/// Converts scorefile coordinates between builds using chain files keyed by
/// `(from_build, to_build)`.
///
#[derive(Debug, Default)]
pub struct CoordinateLifter {
    chains: FxHashMap<(GenomeBuild, GenomeBuild), ChainFile>,
}

impl CoordinateLifter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chain(&mut self, from: GenomeBuild, to: GenomeBuild, chain: ChainFile) {
        self.chains.insert((from, to), chain);
    }

    ///
    /// Load the UCSC chains found in a directory, e.g. `hg19ToHg38.over.chain.gz`
    /// and `hg38ToHg19.over.chain.gz`. Missing files are skipped; asking for a
    /// direction without a chain fails at [CoordinateLifter::lift] time.
    ///
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut lifter = CoordinateLifter::new();
        let directions = [
            (GenomeBuild::GRCh37, GenomeBuild::GRCh38),
            (GenomeBuild::GRCh38, GenomeBuild::GRCh37),
        ];

        for (from, to) in directions {
            let path = dir.join(from.chain_file_name(to));
            if path.is_file() {
                info!("Loading chain file {}", path.display());
                lifter.add_chain(from, to, ChainFile::try_from(path.as_path())?);
            } else {
                debug!("No chain file at {}", path.display());
            }
        }

        Ok(lifter)
    }

    ///
    /// Convert one 1-based coordinate. Succeeds only when the chain reports
    /// exactly one candidate location.
    ///
    pub fn convert_coordinate(chain: &ChainFile, chr: &str, pos: u64) -> Option<(String, u64)> {
        if pos == 0 {
            return None;
        }

        let contig = if chr.starts_with(CHR_PREFIX) {
            chr.to_string()
        } else {
            format!("{}{}", CHR_PREFIX, chr)
        };

        let candidates = chain.convert(&contig, pos - 1);
        if candidates.len() != 1 {
            return None;
        }

        let first = &candidates[0];
        let lifted_chr = parse_lifted_chrom(&first.chr)?;
        Some((lifted_chr, first.pos + 1))
    }

    ///
    /// Lift all variants of one accession from `from` to `to`.
    ///
    /// # Arguments
    /// - accession: scorefile accession, for error context
    /// - variants: variants to convert, consumed
    /// - from: build of the scorefile
    /// - to: build of the target data
    /// - min_success_rate: the mapped fraction must be strictly above this value
    ///
    pub fn lift(
        &self,
        accession: &str,
        variants: Vec<ScoreVariant>,
        from: GenomeBuild,
        to: GenomeBuild,
        min_success_rate: f64,
    ) -> Result<LiftoverOutcome> {
        let mut outcome = LiftoverOutcome::default();

        if from == to {
            info!(
                "{}: scorefile and target build are both {}, skipping liftover",
                accession, from
            );
            outcome.records = variants
                .iter()
                .map(|v| LiftoverRecord {
                    accession: v.accession.clone(),
                    line: v.line,
                    original_chr: v.chr.clone(),
                    original_pos: v.pos,
                    lifted_chr: Some(v.chr.clone()),
                    lifted_pos: Some(v.pos),
                    status: LiftStatus::NotApplicable,
                })
                .collect();
            outcome.mapped = variants;
            return Ok(outcome);
        }

        let chain = self
            .chains
            .get(&(from, to))
            .ok_or(PgscError::MissingChain { from, to })?;

        for mut variant in variants {
            let converted = Self::convert_coordinate(chain, &variant.chr, variant.pos);
            let mut record = LiftoverRecord {
                accession: variant.accession.clone(),
                line: variant.line,
                original_chr: variant.chr.clone(),
                original_pos: variant.pos,
                lifted_chr: None,
                lifted_pos: None,
                status: LiftStatus::Unmapped,
            };

            match converted {
                Some((chr, pos)) => {
                    record.lifted_chr = Some(chr.clone());
                    record.lifted_pos = Some(pos);
                    record.status = LiftStatus::Mapped;
                    variant.chr = chr;
                    variant.pos = pos;
                    outcome.mapped.push(variant);
                }
                None => outcome.unmapped.push(variant),
            }
            outcome.records.push(record);
        }

        let rate = outcome.mapped_rate();
        info!(
            "{}: lifted {} -> {}, mapped {} unmapped {} ({:.4})",
            accession,
            from,
            to,
            outcome.mapped.len(),
            outcome.unmapped.len(),
            rate
        );

        if outcome.total() > 0 && rate <= min_success_rate {
            return Err(PgscError::LiftoverCoverage {
                accession: accession.to_string(),
                from,
                to,
                mapped: outcome.mapped.len(),
                total: outcome.total(),
                rate,
                min_success_rate,
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsc_core::models::EffectType;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn variant(chr: &str, pos: u64, line: usize) -> ScoreVariant {
        ScoreVariant {
            chr: chr.to_string(),
            pos,
            effect_allele: "A".to_string(),
            other_allele: Some("G".to_string()),
            effect_weight: 1.0,
            effect_type: EffectType::Additive,
            accession: "PGS000802".to_string(),
            line,
        }
    }

    #[fixture]
    fn lifter() -> CoordinateLifter {
        // chr22:1-1000 shifts by +500, chr22:2001-3000 lands on an alt scaffold,
        // chr22:3001-3100 is covered by two chains
        let data = "chain 100 chr22 50000 + 0 1000 chr22 50000 + 500 1500 1\n1000\n\n\
                    chain 90 chr22 50000 + 2000 3000 chr22_KI270879v1_alt 5000 + 0 1000 2\n1000\n\n\
                    chain 80 chr22 50000 + 3000 3100 chr22 50000 + 4000 4100 3\n100\n\n\
                    chain 70 chr22 50000 + 3000 3100 chr21 50000 + 100 200 4\n100\n";
        let mut lifter = CoordinateLifter::new();
        lifter.add_chain(
            GenomeBuild::GRCh38,
            GenomeBuild::GRCh37,
            ChainFile::parse(data.as_bytes()).unwrap(),
        );
        lifter
    }

    #[rstest]
    fn test_same_build_is_identity(lifter: CoordinateLifter) {
        let variants = vec![variant("22", 10, 2), variant("22", 99999, 3)];
        let outcome = lifter
            .lift(
                "PGS000802",
                variants.clone(),
                GenomeBuild::GRCh38,
                GenomeBuild::GRCh38,
                0.95,
            )
            .unwrap();
        assert_eq!(outcome.mapped, variants);
        assert!(outcome.unmapped.is_empty());
        assert!(outcome.records.iter().all(|r| r.success().is_none()));
    }

    #[rstest]
    fn test_lift_shifts_positions(lifter: CoordinateLifter) {
        let variants = vec![variant("22", 1, 2), variant("chr22", 1000, 3)];
        let outcome = lifter
            .lift(
                "PGS000802",
                variants,
                GenomeBuild::GRCh38,
                GenomeBuild::GRCh37,
                0.95,
            )
            .unwrap();
        assert_eq!(outcome.mapped.len(), 2);
        assert_eq!(outcome.mapped[0].pos, 501);
        assert_eq!(outcome.mapped[0].chr, "22");
        assert_eq!(outcome.mapped[1].pos, 1500);
        assert_eq!(outcome.records[0].original_pos, 1);
        assert_eq!(outcome.records[0].lifted_pos, Some(501));
        assert_eq!(outcome.records[0].success(), Some(true));
    }

    #[rstest]
    fn test_scaffold_suffix_is_truncated(lifter: CoordinateLifter) {
        let chain = &lifter.chains[&(GenomeBuild::GRCh38, GenomeBuild::GRCh37)];
        assert_eq!(
            CoordinateLifter::convert_coordinate(chain, "22", 2001),
            Some(("22".to_string(), 1))
        );
    }

    #[rstest]
    #[case("22", 1500)]
    #[case("22", 3050)]
    #[case("21", 10)]
    #[case("22", 0)]
    fn test_unmappable(lifter: CoordinateLifter, #[case] chr: &str, #[case] pos: u64) {
        let chain = &lifter.chains[&(GenomeBuild::GRCh38, GenomeBuild::GRCh37)];
        assert_eq!(CoordinateLifter::convert_coordinate(chain, chr, pos), None);
    }

    #[rstest]
    fn test_low_coverage_fails(lifter: CoordinateLifter) {
        let variants = vec![variant("22", 10, 2), variant("22", 1500, 3)];
        let result = lifter.lift(
            "PGS000802",
            variants,
            GenomeBuild::GRCh38,
            GenomeBuild::GRCh37,
            0.95,
        );
        assert!(matches!(
            result,
            Err(PgscError::LiftoverCoverage { mapped: 1, total: 2, .. })
        ));
    }

    #[rstest]
    fn test_rate_equal_to_threshold_fails(lifter: CoordinateLifter) {
        let variants = vec![variant("22", 10, 2), variant("22", 1500, 3)];
        let (from, to) = (GenomeBuild::GRCh38, GenomeBuild::GRCh37);
        assert!(lifter.lift("PGS000802", variants.clone(), from, to, 0.5).is_err());

        let outcome = lifter.lift("PGS000802", variants, from, to, 0.4).unwrap();
        assert_eq!(outcome.unmapped.len(), 1);
        assert_eq!(outcome.records[1].success(), Some(false));
    }

    #[rstest]
    fn test_missing_chain(lifter: CoordinateLifter) {
        let result = lifter.lift(
            "PGS000802",
            vec![variant("22", 10, 2)],
            GenomeBuild::GRCh37,
            GenomeBuild::GRCh38,
            0.95,
        );
        assert!(matches!(result, Err(PgscError::MissingChain { .. })));
    }

    #[rstest]
    fn test_from_dir_loads_named_chains() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let file = std::fs::File::create(dir.path().join("hg19ToHg38.over.chain.gz")).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(b"chain 1 chr1 100 + 0 100 chr1 100 + 0 100 1\n100\n")
            .unwrap();
        encoder.finish().unwrap();

        let lifter = CoordinateLifter::from_dir(dir.path()).unwrap();
        assert_eq!(lifter.chains.len(), 1);
        assert!(lifter
            .chains
            .contains_key(&(GenomeBuild::GRCh37, GenomeBuild::GRCh38)));
    }
}
