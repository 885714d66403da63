//! Bucket summaries and the audit report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::category::Category;
use crate::record::ObjectSample;

/// Format a byte count in human-readable binary units.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Object count and byte total for one value of a rollup dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Rollup {
    pub count: u64,
    pub bytes: u64,
}

impl Rollup {
    /// Add one object of the given size.
    pub fn record(&mut self, size: u64) {
        self.count += 1;
        self.bytes += size;
    }
}

impl Serialize for Rollup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Rollup", 3)?;
        state.serialize_field("count", &self.count)?;
        state.serialize_field("bytes", &self.bytes)?;
        state.serialize_field("bytes_human", &format_size(self.bytes))?;
        state.end()
    }
}

/// Totals for a top-level key prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixTotals {
    pub prefix: CompactString,
    pub count: u64,
    pub bytes: u64,
    pub bytes_human: String,
}

impl PrefixTotals {
    pub fn new(prefix: impl Into<CompactString>, totals: Rollup) -> Self {
        Self {
            prefix: prefix.into(),
            count: totals.count,
            bytes: totals.bytes,
            bytes_human: format_size(totals.bytes),
        }
    }
}

/// Totals for a second-level segment under one top-level prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondLevelTotals {
    pub second: CompactString,
    pub count: u64,
    pub bytes: u64,
    pub bytes_human: String,
}

impl SecondLevelTotals {
    pub fn new(second: impl Into<CompactString>, totals: Rollup) -> Self {
        Self {
            second: second.into(),
            count: totals.count,
            bytes: totals.bytes,
            bytes_human: format_size(totals.bytes),
        }
    }
}

/// Storage usage rollup for a single bucket.
///
/// Produced once per bucket after its listing has been fully consumed and
/// read-only from then on. Ranked lists are already sorted and truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Bucket name.
    pub bucket: String,
    /// Endpoint the bucket was listed through.
    pub endpoint: String,
    /// Region the bucket resolved to.
    pub region: String,
    /// Total object count.
    pub objects: u64,
    /// Total size in bytes.
    pub bytes: u64,
    /// `bytes` in human-readable form.
    pub bytes_human: String,
    /// Most recent modification time seen, if any object carried one.
    pub last_modified: Option<DateTime<Utc>>,
    /// Top-level prefixes by bytes, descending.
    pub top_prefixes: Vec<PrefixTotals>,
    /// `(extension, count)` pairs by count, descending.
    pub ext_histogram: Vec<(CompactString, u64)>,
    /// Every observed category, by bytes descending.
    pub groups: IndexMap<Category, Rollup>,
    /// Per-year totals, ascending by year.
    pub year_histogram: BTreeMap<String, Rollup>,
    /// Second-level breakdown per top-level prefix, in first-seen prefix order.
    pub depth2: IndexMap<CompactString, Vec<SecondLevelTotals>>,
    /// First objects encountered, in listing order.
    pub samples: Vec<ObjectSample>,
}

impl BucketSummary {
    /// Whether the bucket held no countable objects.
    pub fn is_empty(&self) -> bool {
        self.objects == 0
    }

    /// Totals for a category, if any object fell into it.
    pub fn category(&self, category: Category) -> Option<&Rollup> {
        self.groups.get(&category)
    }

    /// Second-level breakdown for a top-level prefix.
    pub fn second_level(&self, prefix: &str) -> &[SecondLevelTotals] {
        self.depth2.get(prefix).map(Vec::as_slice).unwrap_or_default()
    }

    /// The category holding the most bytes.
    pub fn largest_category(&self) -> Option<(Category, &Rollup)> {
        self.groups.first().map(|(c, r)| (*c, r))
    }
}

/// Complete audit output: one summary per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Endpoint used for account-level calls.
    pub default_endpoint: String,
    /// Summaries in bucket listing order.
    pub buckets: Vec<BucketSummary>,
}

impl Report {
    pub fn new(default_endpoint: impl Into<String>) -> Self {
        Self {
            default_endpoint: default_endpoint.into(),
            buckets: Vec::new(),
        }
    }

    /// Objects across all buckets.
    pub fn total_objects(&self) -> u64 {
        self.buckets.iter().map(|b| b.objects).sum()
    }

    /// Bytes across all buckets.
    pub fn total_bytes(&self) -> u64 {
        self.buckets.iter().map(|b| b.bytes).sum()
    }
}
