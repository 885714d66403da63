//! Core types and configuration for gravitys3.
//!
//! This crate provides the fundamental data structures used throughout
//! the gravitys3 workspace: object records, file categories, per-bucket
//! summaries, the audit report, and run configuration.

mod category;
mod config;
mod error;
mod record;
mod summary;

pub use category::{Category, NO_EXTENSION};
pub use config::{
    AuditConfig, AuditConfigBuilder, BucketLocation, DEFAULT_ENDPOINT, DEFAULT_REGION,
};
pub use error::{ConfigError, ListError};
pub use record::{ObjectRecord, ObjectSample};
pub use summary::{
    BucketSummary, PrefixTotals, Report, Rollup, SecondLevelTotals, format_size,
};
