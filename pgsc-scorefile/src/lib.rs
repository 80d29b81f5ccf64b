//! # Polygenic scoring files
//!
//! Read PGS Catalog formatted scoring files, apply quality control and write
//! matched variants back out as scoring tables.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use pgsc_scorefile::read_scorefile;
//!
//! let set = read_scorefile(Path::new("PGS000001.txt.gz")).unwrap();
//! for (accession, variants) in &set.scorefiles {
//!     println!("{}: {} variants", accession, variants.len());
//! }
//! ```
pub mod consts;
pub mod qc;
pub mod reader;
pub mod writer;

pub use qc::{QcFailure, QcReason, QcSummary, quality_control};
pub use reader::{ScorefileSet, check_build, read_build, read_scorefile};
pub use writer::{WriterOptions, write_tables};
