//! Classification and rollup algorithms for gravitys3.
//!
//! This crate turns a flat stream of object records into the per-bucket
//! rollups that make up an audit report:
//!
//! - **Classification** - map a file extension to a semantic [`Category`]
//! - **Summaries** - fold records into prefix, extension, category and year
//!   totals in a single pass
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use gravitys3_analyze::{SummaryConfig, summarize};
//! use gravitys3_core::{BucketLocation, ObjectRecord};
//!
//! let when = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
//! let records = vec![
//!     ObjectRecord::new("shoot/day1/A001.braw", 4096, when),
//!     ObjectRecord::new("shoot/day1/A001.xmp", 12, when),
//! ];
//!
//! let location = BucketLocation::primary("https://s3.wasabisys.com");
//! let summary = summarize("media", location, records, SummaryConfig::default());
//!
//! assert_eq!(summary.objects, 2);
//! assert_eq!(summary.top_prefixes[0].prefix, "shoot");
//! ```

mod classify;
mod summarize;

pub use classify::{classify, extension_of};
pub use summarize::{Summarizer, SummaryConfig, SummaryConfigBuilder, summarize, try_summarize};

// Re-export core types
pub use gravitys3_core::{BucketSummary, Category, ObjectRecord};
