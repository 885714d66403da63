//! Single-pass bucket rollups.
//!
//! A [`Summarizer`] consumes object records one at a time and keeps only
//! bounded rollups: maps keyed by observed prefixes, extensions, categories
//! and years, plus a capped sample list. Memory therefore grows with the
//! number of distinct values seen, never with the number of objects.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use compact_str::CompactString;
use derive_builder::Builder;
use indexmap::IndexMap;

use gravitys3_core::{
    BucketLocation, BucketSummary, Category, ObjectRecord, ObjectSample, PrefixTotals, Rollup,
    SecondLevelTotals, format_size,
};

use crate::classify::{classify, extension_of};

/// Configuration for bucket summaries.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SummaryConfig {
    /// Number of leading objects kept as samples.
    #[builder(default = "20")]
    pub sample_cap: usize,

    /// Top-level prefixes kept in the ranked list.
    #[builder(default = "20")]
    pub max_prefixes: usize,

    /// Extensions kept in the histogram.
    #[builder(default = "50")]
    pub max_extensions: usize,

    /// Second-level segments kept per top-level prefix.
    #[builder(default = "20")]
    pub max_second_level: usize,
}

impl SummaryConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.sample_cap == Some(0) {
            return Err("Sample cap must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            sample_cap: 20,
            max_prefixes: 20,
            max_extensions: 50,
            max_second_level: 20,
        }
    }
}

impl SummaryConfig {
    /// Create a new config builder.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder::default()
    }

    /// Default limits with a custom sample cap.
    pub fn with_sample_cap(sample_cap: usize) -> Self {
        Self {
            sample_cap,
            ..Self::default()
        }
    }
}

/// Accumulating state for one bucket.
///
/// Feed records with [`record`](Self::record) (or [`Extend`]), then call
/// [`finish`](Self::finish) to rank, truncate and freeze the result.
#[derive(Debug)]
pub struct Summarizer {
    bucket: String,
    location: BucketLocation,
    config: SummaryConfig,
    objects: u64,
    bytes: u64,
    last_modified: Option<DateTime<Utc>>,
    extensions: IndexMap<CompactString, u64>,
    groups: IndexMap<Category, Rollup>,
    years: BTreeMap<String, Rollup>,
    prefixes: IndexMap<CompactString, Rollup>,
    second_level: IndexMap<CompactString, IndexMap<CompactString, Rollup>>,
    samples: Vec<ObjectSample>,
}

impl Summarizer {
    /// Start an empty summary for a bucket.
    pub fn new(bucket: impl Into<String>, location: BucketLocation, config: SummaryConfig) -> Self {
        Self {
            bucket: bucket.into(),
            location,
            config,
            objects: 0,
            bytes: 0,
            last_modified: None,
            extensions: IndexMap::new(),
            groups: IndexMap::new(),
            years: BTreeMap::new(),
            prefixes: IndexMap::new(),
            second_level: IndexMap::new(),
            samples: Vec::new(),
        }
    }

    /// Objects counted so far.
    pub fn objects(&self) -> u64 {
        self.objects
    }

    /// Bytes counted so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Fold one object into every rollup.
    ///
    /// Records with an empty key are ignored entirely.
    pub fn record(&mut self, object: ObjectRecord) {
        if object.key.is_empty() {
            tracing::trace!(bucket = %self.bucket, "skipping object with empty key");
            return;
        }

        let size = object.size;
        self.objects += 1;
        self.bytes += size;

        let ext = extension_of(&object.key);
        *self.extensions.entry(CompactString::from(&*ext)).or_insert(0) += 1;
        self.groups.entry(classify(&ext)).or_default().record(size);

        if let Some(modified) = object.last_modified {
            if self.last_modified.is_none_or(|newest| modified > newest) {
                self.last_modified = Some(modified);
            }
            self.years
                .entry(modified.year().to_string())
                .or_default()
                .record(size);
        }

        let top = object.top_level();
        self.prefixes
            .entry(CompactString::from(top))
            .or_default()
            .record(size);

        if let Some(second) = object.second_level() {
            self.second_level
                .entry(CompactString::from(top))
                .or_default()
                .entry(CompactString::from(second))
                .or_default()
                .record(size);
        }

        if self.samples.len() < self.config.sample_cap {
            self.samples.push(ObjectSample {
                key: object.key,
                size,
            });
        }
    }

    /// Rank and truncate the rollups, producing the final summary.
    pub fn finish(self) -> BucketSummary {
        let Self {
            bucket,
            location,
            config,
            objects,
            bytes,
            last_modified,
            extensions,
            mut groups,
            years,
            prefixes,
            second_level,
            samples,
        } = self;

        let top_prefixes: Vec<_> = ranked_by_bytes(prefixes, config.max_prefixes)
            .map(|(prefix, totals)| PrefixTotals::new(prefix, totals))
            .collect();

        let mut ext_histogram: Vec<(CompactString, u64)> = extensions.into_iter().collect();
        ext_histogram.sort_by(|a, b| b.1.cmp(&a.1));
        ext_histogram.truncate(config.max_extensions);

        groups.sort_by(|_, a, _, b| b.bytes.cmp(&a.bytes));

        let depth2: IndexMap<_, _> = second_level
            .into_iter()
            .map(|(top, seconds)| {
                let ranked: Vec<_> = ranked_by_bytes(seconds, config.max_second_level)
                    .map(|(second, totals)| SecondLevelTotals::new(second, totals))
                    .collect();
                (top, ranked)
            })
            .collect();

        tracing::debug!(
            bucket = %bucket,
            objects,
            bytes,
            categories = groups.len(),
            "bucket summary finalized"
        );

        BucketSummary {
            bucket,
            endpoint: location.endpoint,
            region: location.region,
            objects,
            bytes,
            bytes_human: format_size(bytes),
            last_modified,
            top_prefixes,
            ext_histogram,
            groups,
            year_histogram: years,
            depth2,
            samples,
        }
    }
}

impl Extend<ObjectRecord> for Summarizer {
    fn extend<T: IntoIterator<Item = ObjectRecord>>(&mut self, iter: T) {
        for object in iter {
            self.record(object);
        }
    }
}

/// Sort entries by bytes descending, keeping first-seen order among ties.
fn ranked_by_bytes(
    entries: IndexMap<CompactString, Rollup>,
    limit: usize,
) -> impl Iterator<Item = (CompactString, Rollup)> {
    let mut entries: Vec<_> = entries.into_iter().collect();
    entries.sort_by(|a, b| b.1.bytes.cmp(&a.1.bytes));
    entries.into_iter().take(limit)
}

/// Summarize a finite sequence of records in a single pass.
pub fn summarize<I>(
    bucket: impl Into<String>,
    location: BucketLocation,
    objects: I,
    config: SummaryConfig,
) -> BucketSummary
where
    I: IntoIterator<Item = ObjectRecord>,
{
    let mut summarizer = Summarizer::new(bucket, location, config);
    summarizer.extend(objects);
    summarizer.finish()
}

/// Summarize a fallible sequence, stopping at the first error.
///
/// The error is returned untouched; no partial summary is produced.
pub fn try_summarize<I, E>(
    bucket: impl Into<String>,
    location: BucketLocation,
    objects: I,
    config: SummaryConfig,
) -> Result<BucketSummary, E>
where
    I: IntoIterator<Item = Result<ObjectRecord, E>>,
{
    let mut summarizer = Summarizer::new(bucket, location, config);
    for object in objects {
        summarizer.record(object?);
    }
    Ok(summarizer.finish())
}
