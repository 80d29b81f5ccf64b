//! # Core models and utilities for polygenic score variant matching.
//!
//! This crate holds the data model shared by the rest of the workspace:
//! scorefile variants, target variants, match records and liftover records,
//! along with the error taxonomy and small io helpers for reading plain or
//! gzipped tables.
//!
pub mod consts;
pub mod errors;
pub mod models;
pub mod utils;

pub use errors::{PgscError, Result};
