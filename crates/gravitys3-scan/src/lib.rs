//! S3 bucket listing engine for gravitys3.
//!
//! This crate is the read-only bridge to an S3-compatible service. It
//! enumerates buckets, resolves each bucket's region and endpoint, and
//! exposes a bucket's objects as a lazy stream of pages.
//!
//! # Overview
//!
//! - **Explicit credentials** - configuration is loaded once and passed in
//! - **Per-bucket endpoints** - regional buckets are listed through their
//!   regional host
//! - **Lazy pagination** - pages are fetched only as the stream is polled
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use gravitys3_scan::{AuditConfig, S3Lister};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuditConfig::from_env()?;
//! let lister = S3Lister::connect(&config).await;
//!
//! for bucket in lister.list_buckets().await? {
//!     let location = lister.bucket_location(&bucket).await;
//!     let pages = lister.object_pages(&bucket, &location);
//!     futures::pin_mut!(pages);
//!     while let Some(page) = pages.try_next().await? {
//!         println!("{bucket}: {} objects in page", page.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod lister;
mod progress;

pub use lister::S3Lister;
pub use progress::ListProgress;

// Re-export core types for convenience
pub use gravitys3_core::{AuditConfig, BucketLocation, ListError, ObjectRecord};
