//! UCSC chain file parsing and a per-contig interval tree over aligned blocks.
//!
//! A chain maps a region of the source ("target" in UCSC terms) assembly onto
//! the destination ("query") assembly as a run of ungapped blocks. Positions
//! handled here are 0-based.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use fxhash::FxHashMap;
use rust_lapper::{Interval, Lapper};
use thiserror::Error;

use pgsc_core::PgscError;
use pgsc_core::utils::get_dynamic_reader;

#[derive(Error, Debug)]
pub enum ChainFileError {
    #[error("Invalid chain header at line {line}: {msg}")]
    InvalidHeader { line: usize, msg: String },

    #[error("Invalid alignment block at line {line}: {msg}")]
    InvalidBlock { line: usize, msg: String },

    #[error("Alignment block outside of a chain at line {0}")]
    OrphanBlock(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ChainFileError> for PgscError {
    fn from(value: ChainFileError) -> Self {
        match value {
            ChainFileError::Io(e) => PgscError::Io(e),
            other => PgscError::ChainFile(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    fn parse(s: &str, line: usize) -> Result<Self, ChainFileError> {
        match s {
            "+" => Ok(Strand::Plus),
            "-" => Ok(Strand::Minus),
            _ => Err(ChainFileError::InvalidHeader {
                line,
                msg: format!("invalid strand '{}'", s),
            }),
        }
    }
}

/// An ungapped alignment block, followed by gaps in both assemblies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainBlock {
    pub size: u64,
    pub target_gap: u64,
    pub query_gap: u64,
}

#[derive(Debug, Clone)]
pub struct Chain {
    pub id: u64,
    pub score: u64,
    pub target_name: String,
    pub target_size: u64,
    pub target_start: u64,
    pub target_end: u64,
    pub query_name: String,
    pub query_size: u64,
    pub query_strand: Strand,
    pub query_start: u64,
    pub query_end: u64,
    pub blocks: Vec<ChainBlock>,
}

impl Chain {
    fn parse_header(line: &str, line_num: usize) -> Result<Chain, ChainFileError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 12 {
            return Err(ChainFileError::InvalidHeader {
                line: line_num,
                msg: format!("expected at least 12 fields, got {}", parts.len()),
            });
        }

        let number = |idx: usize, name: &str| -> Result<u64, ChainFileError> {
            parts[idx]
                .parse::<u64>()
                .map_err(|_| ChainFileError::InvalidHeader {
                    line: line_num,
                    msg: format!("invalid {} '{}'", name, parts[idx]),
                })
        };

        // target strand is always '+' in UCSC chains, but validate it anyway
        Strand::parse(parts[4], line_num)?;

        Ok(Chain {
            score: number(1, "score")?,
            target_name: parts[2].to_string(),
            target_size: number(3, "target size")?,
            target_start: number(5, "target start")?,
            target_end: number(6, "target end")?,
            query_name: parts[7].to_string(),
            query_size: number(8, "query size")?,
            query_strand: Strand::parse(parts[9], line_num)?,
            query_start: number(10, "query start")?,
            query_end: number(11, "query end")?,
            id: parts.get(12).and_then(|s| s.parse().ok()).unwrap_or(0),
            blocks: Vec::new(),
        })
    }

    fn parse_block(line: &str, line_num: usize) -> Result<ChainBlock, ChainFileError> {
        let mut values = line.split_whitespace().map(|s| {
            s.parse::<u64>().map_err(|_| ChainFileError::InvalidBlock {
                line: line_num,
                msg: format!("invalid number '{}'", s),
            })
        });

        let size = values.next().transpose()?.ok_or(ChainFileError::InvalidBlock {
            line: line_num,
            msg: "empty block".to_string(),
        })?;
        // the last block of a chain only has a size
        let target_gap = values.next().transpose()?.unwrap_or(0);
        let query_gap = values.next().transpose()?.unwrap_or(0);

        Ok(ChainBlock {
            size,
            target_gap,
            query_gap,
        })
    }
}

/// One aligned block, flattened out of its chain for indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockRef {
    chain: usize,
    // position of the block in file order, used to report candidates in chain order
    ordinal: usize,
    query_start: u64,
}

/// A candidate location for a lifted position (0-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftedPosition {
    pub chr: String,
    pub pos: u64,
    pub strand: Strand,
}

///
/// Chain file indexed by source contig. Each contig maps to an interval tree
/// of aligned blocks.
///
#[derive(Debug, Clone, Default)]
pub struct ChainFile {
    chains: Vec<Chain>,
    index: FxHashMap<String, Lapper<u64, BlockRef>>,
}

impl TryFrom<&Path> for ChainFile {
    type Error = PgscError;

    ///
    /// Load a chain file from disk (`.chain` or `.chain.gz`).
    ///
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let reader = get_dynamic_reader(value)?;
        Ok(ChainFile::parse(reader)?)
    }
}

impl ChainFile {
    /// Parse chain data from a reader.
    pub fn parse<R: Read>(reader: R) -> Result<Self, ChainFileError> {
        let reader = BufReader::new(reader);
        let mut chains: Vec<Chain> = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = i + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with("chain") {
                chains.push(Chain::parse_header(line, line_num)?);
            } else {
                let block = Chain::parse_block(line, line_num)?;
                chains
                    .last_mut()
                    .ok_or(ChainFileError::OrphanBlock(line_num))?
                    .blocks
                    .push(block);
            }
        }

        Ok(ChainFile::from_chains(chains))
    }

    pub fn from_chains(chains: Vec<Chain>) -> Self {
        let mut per_contig: FxHashMap<String, Vec<Interval<u64, BlockRef>>> = FxHashMap::default();
        let mut ordinal = 0;

        for (chain_idx, chain) in chains.iter().enumerate() {
            let intervals = per_contig.entry(chain.target_name.clone()).or_default();
            let mut t_pos = chain.target_start;
            let mut q_pos = chain.query_start;

            for block in &chain.blocks {
                intervals.push(Interval {
                    start: t_pos,
                    stop: t_pos + block.size,
                    val: BlockRef {
                        chain: chain_idx,
                        ordinal,
                        query_start: q_pos,
                    },
                });
                ordinal += 1;
                t_pos += block.size + block.target_gap;
                q_pos += block.size + block.query_gap;
            }
        }

        let index = per_contig
            .into_iter()
            .map(|(contig, intervals)| (contig, Lapper::new(intervals)))
            .collect();

        ChainFile { chains, index }
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    ///
    /// Every location a 0-based position maps to, in chain file order.
    /// Positions in alignment gaps or outside any chain return nothing.
    ///
    pub fn convert(&self, contig: &str, pos: u64) -> Vec<LiftedPosition> {
        let Some(tree) = self.index.get(contig) else {
            return Vec::new();
        };

        let mut hits: Vec<&Interval<u64, BlockRef>> = tree.find(pos, pos + 1).collect();
        hits.sort_by_key(|iv| iv.val.ordinal);

        hits.into_iter()
            .filter_map(|iv| {
                let chain = &self.chains[iv.val.chain];
                let offset = iv.val.query_start + (pos - iv.start);
                // a block running past query_size is malformed, drop the candidate
                let pos = match chain.query_strand {
                    Strand::Plus => offset,
                    Strand::Minus => chain.query_size.checked_sub(offset + 1)?,
                };
                Some(LiftedPosition {
                    chr: chain.query_name.clone(),
                    pos,
                    strand: chain.query_strand,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn simple_chain() -> ChainFile {
        let data = "chain 1000 chr1 1000 + 0 1000 chr1 1100 + 0 1100 1\n\
                    100\t10\t20\n\
                    200\t5\t5\n\
                    500\n\n";
        ChainFile::parse(data.as_bytes()).unwrap()
    }

    #[rstest]
    fn test_parse_chain_file(simple_chain: ChainFile) {
        assert_eq!(simple_chain.chain_count(), 1);
        let chain = &simple_chain.chains[0];
        assert_eq!(chain.id, 1);
        assert_eq!(chain.score, 1000);
        assert_eq!(chain.target_name, "chr1");
        assert_eq!(chain.query_size, 1100);
        assert_eq!(chain.blocks.len(), 3);
        assert_eq!(
            chain.blocks[0],
            ChainBlock {
                size: 100,
                target_gap: 10,
                query_gap: 20
            }
        );
        assert_eq!(chain.blocks[2].target_gap, 0);
    }

    #[rstest]
    #[case(50, Some(50))]
    #[case(105, None)]
    #[case(110, Some(120))]
    #[case(309, Some(319))]
    #[case(2000, None)]
    fn test_convert_position(simple_chain: ChainFile, #[case] pos: u64, #[case] expected: Option<u64>) {
        let lifted = simple_chain.convert("chr1", pos);
        assert_eq!(lifted.first().map(|l| l.pos), expected);
    }

    #[rstest]
    fn test_unknown_contig(simple_chain: ChainFile) {
        assert!(simple_chain.convert("chr2", 50).is_empty());
    }

    #[rstest]
    fn test_minus_strand() {
        let data = "chain 500 chr2 1000 + 0 100 chr5 1000 - 0 100 7\n100\n";
        let chain_file = ChainFile::parse(data.as_bytes()).unwrap();
        let lifted = chain_file.convert("chr2", 10);
        assert_eq!(lifted.len(), 1);
        assert_eq!(lifted[0].chr, "chr5");
        assert_eq!(lifted[0].pos, 989);
        assert_eq!(lifted[0].strand, Strand::Minus);
    }

    #[rstest]
    fn test_overlapping_chains_in_file_order() {
        let data = "chain 2000 chr1 1000 + 0 500 chr1 1000 + 100 600 1\n500\n\n\
                    chain 1000 chr1 1000 + 50 800 chr1_alt 1000 + 0 750 2\n750\n";
        let chain_file = ChainFile::parse(data.as_bytes()).unwrap();

        let lifted = chain_file.convert("chr1", 100);
        assert_eq!(lifted.len(), 2);
        assert_eq!(lifted[0].chr, "chr1");
        assert_eq!(lifted[0].pos, 200);
        assert_eq!(lifted[1].chr, "chr1_alt");
        assert_eq!(lifted[1].pos, 50);

        // only covered by the second chain
        let lifted = chain_file.convert("chr1", 600);
        assert_eq!(lifted.len(), 1);
        assert_eq!(lifted[0].pos, 550);
    }

    #[rstest]
    fn test_minus_strand_block_past_query_size() {
        let data = "chain 500 chr2 1000 + 0 100 chr5 50 - 0 100 8\n100\n";
        let chain_file = ChainFile::parse(data.as_bytes()).unwrap();
        assert_eq!(chain_file.convert("chr2", 10).len(), 1);
        assert!(chain_file.convert("chr2", 60).is_empty());
    }

    #[rstest]
    fn test_adjacent_blocks_half_open() {
        let data = "chain 1000 chr1 1000 + 0 200 chr1 1000 + 0 200 1\n100\t0\t0\n100\n";
        let chain_file = ChainFile::parse(data.as_bytes()).unwrap();
        let lifted = chain_file.convert("chr1", 100);
        assert_eq!(lifted.len(), 1);
        assert_eq!(lifted[0].pos, 100);
    }

    #[rstest]
    fn test_invalid_header() {
        let data = "chain 1000 chr1 1000 +\n";
        assert!(matches!(
            ChainFile::parse(data.as_bytes()),
            Err(ChainFileError::InvalidHeader { line: 1, .. })
        ));
    }

    #[rstest]
    fn test_orphan_block() {
        assert!(matches!(
            ChainFile::parse("100\t0\t0\n".as_bytes()),
            Err(ChainFileError::OrphanBlock(1))
        ));
    }
}
