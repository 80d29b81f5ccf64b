//! # Genome build liftover for scorefile variants.
//!
//! Scorefiles are published on one genome build and target genotypes may be on
//! another. This crate converts 1-based scorefile coordinates with UCSC chain
//! files (`hg19ToHg38.over.chain.gz`, `hg38ToHg19.over.chain.gz`).
//!
//! ```no_run
//! use std::path::Path;
//! use pgsc_core::models::GenomeBuild;
//! use pgsc_liftover::CoordinateLifter;
//!
//! let lifter = CoordinateLifter::from_dir(Path::new("chains/")).unwrap();
//! let outcome = lifter
//!     .lift("PGS000802", vec![], GenomeBuild::GRCh37, GenomeBuild::GRCh38, 0.95)
//!     .unwrap();
//! println!("mapped {:.2}", outcome.mapped_rate());
//! ```
pub mod chain;
pub mod lifter;

// re-exports
pub use chain::{ChainFile, ChainFileError};
pub use lifter::{CoordinateLifter, LiftoverOutcome};
