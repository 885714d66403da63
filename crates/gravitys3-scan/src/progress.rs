//! Listing progress reporting.

use std::time::{Duration, Instant};

use gravitys3_core::ObjectRecord;

/// Progress information while a bucket is being listed.
#[derive(Debug, Clone)]
pub struct ListProgress {
    /// Bucket currently being listed.
    pub bucket: String,
    /// Number of listing pages fetched so far.
    pub pages_fetched: u64,
    /// Number of objects listed so far.
    pub objects_listed: u64,
    /// Total bytes listed so far.
    pub bytes_listed: u64,
    /// Time elapsed since the bucket listing started.
    pub elapsed: Duration,
}

impl ListProgress {
    /// Listing rate in objects per second.
    pub fn objects_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.objects_listed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    bucket: String,
    pages_fetched: u64,
    objects_listed: u64,
    bytes_listed: u64,
}

impl ProgressTracker {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            bucket: bucket.into(),
            pages_fetched: 0,
            objects_listed: 0,
            bytes_listed: 0,
        }
    }

    pub fn record_page(&mut self, page: &[ObjectRecord]) {
        self.pages_fetched += 1;
        self.objects_listed += page.len() as u64;
        self.bytes_listed += page.iter().map(|o| o.size).sum::<u64>();
    }

    pub fn snapshot(&self) -> ListProgress {
        ListProgress {
            bucket: self.bucket.clone(),
            pages_fetched: self.pages_fetched,
            objects_listed: self.objects_listed,
            bytes_listed: self.bytes_listed,
            elapsed: self.start_time.elapsed(),
        }
    }
}
