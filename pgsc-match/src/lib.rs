//! # Scorefile variant matching
//!
//! Match the variants of polygenic scoring files against the variants of a
//! target genotype dataset, gate each scorefile on its match rate, and write
//! the matched variants out as scoring tables.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use pgsc_match::{MatchConfig, run_pipeline};
//!
//! let config = MatchConfig::default();
//! let output = run_pipeline(
//!     &["PGS000001.txt.gz"],
//!     &["cineca_22.pvar"],
//!     "cineca",
//!     Path::new("out"),
//!     &config,
//! )
//! .unwrap();
//! println!("{} scoring tables written", output.scorefiles.len());
//! ```
pub mod config;
pub mod consts;
pub mod dedup;
pub mod matcher;
pub mod matchlog;
pub mod pipeline;
pub mod report;
pub mod target;

pub use config::{MatchConfig, MatchConfigError};
pub use dedup::{build_tables, split_effect_type, unduplicate};
pub use matcher::{MatchResult, get_all_matches, match_scorefiles, match_variants};
pub use pipeline::{PipelineOutput, read_scorefiles, run_pipeline};
pub use report::{AccessionSummary, MatchReport, ReportPolicy, check};
pub use target::{TargetIndex, read_target};
