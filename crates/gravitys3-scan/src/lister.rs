//! S3 bucket listing.

use async_stream::try_stream;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::Object;
use chrono::DateTime;
use futures::Stream;
use tokio::sync::broadcast;

use gravitys3_core::{AuditConfig, BucketLocation, ListError, ObjectRecord};

use crate::progress::{ListProgress, ProgressTracker};

/// Read-only listing client for an S3-compatible service.
///
/// Account-level calls go through the configured endpoint. Object listings
/// use a client bound to each bucket's own region and endpoint.
pub struct S3Lister {
    shared: SdkConfig,
    primary: Client,
    endpoint: String,
    progress_tx: broadcast::Sender<ListProgress>,
}

impl S3Lister {
    /// Build the shared SDK configuration from explicit credentials.
    pub async fn connect(config: &AuditConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "gravitys3",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .load()
            .await;

        let home = BucketLocation {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let primary = client_for(&shared, &home);
        let (progress_tx, _) = broadcast::channel(100);

        Self {
            shared,
            primary,
            endpoint: config.endpoint.clone(),
            progress_tx,
        }
    }

    /// Endpoint used for account-level calls.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Subscribe to listing progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ListProgress> {
        self.progress_tx.subscribe()
    }

    /// Names of every bucket visible to the credentials.
    pub async fn list_buckets(&self) -> Result<Vec<String>, ListError> {
        let resp = self
            .primary
            .list_buckets()
            .send()
            .await
            .map_err(|e| ListError::ListBuckets {
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(resp
            .buckets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|b| b.name)
            .collect())
    }

    /// Resolve where a bucket lives.
    ///
    /// Lookup failures are not fatal: the bucket is assumed to be in the
    /// default region at the primary endpoint.
    pub async fn bucket_location(&self, bucket: &str) -> BucketLocation {
        let constraint = match self
            .primary
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
        {
            Ok(resp) => resp.location_constraint().map(|c| c.as_str().to_string()),
            Err(err) => {
                tracing::debug!(
                    bucket,
                    error = %DisplayErrorContext(&err),
                    "bucket location lookup failed, assuming default region"
                );
                None
            }
        };
        BucketLocation::resolve(constraint.as_deref(), &self.endpoint)
    }

    /// Lazily list a bucket's objects, one page at a time.
    ///
    /// Pages are fetched only as the stream is polled, so a caller folding
    /// each page into a summary never holds more than one page in memory.
    /// The first failed page ends the stream with an error.
    pub fn object_pages<'a>(
        &self,
        bucket: &'a str,
        location: &BucketLocation,
    ) -> impl Stream<Item = Result<Vec<ObjectRecord>, ListError>> + 'a {
        let client = client_for(&self.shared, location);
        let progress_tx = self.progress_tx.clone();

        try_stream! {
            let mut tracker = ProgressTracker::new(bucket);
            let mut continuation_token: Option<String> = None;

            loop {
                let resp = client
                    .list_objects_v2()
                    .bucket(bucket)
                    .set_continuation_token(continuation_token.take())
                    .send()
                    .await
                    .map_err(|e| ListError::ListObjects {
                        bucket: bucket.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    })?;

                let page: Vec<ObjectRecord> = resp
                    .contents
                    .unwrap_or_default()
                    .into_iter()
                    .map(to_record)
                    .collect();

                tracker.record_page(&page);
                let _ = progress_tx.send(tracker.snapshot());
                yield page;

                if resp.is_truncated != Some(true) {
                    break;
                }
                match resp.next_continuation_token {
                    Some(token) => continuation_token = Some(token),
                    None => break,
                }
            }
        }
    }
}

/// Client bound to one region and endpoint, with path-style addressing.
fn client_for(shared: &SdkConfig, location: &BucketLocation) -> Client {
    let config = aws_sdk_s3::config::Builder::from(shared)
        .region(Region::new(location.region.clone()))
        .endpoint_url(&location.endpoint)
        .force_path_style(true)
        .build();
    Client::from_conf(config)
}

/// Convert a listed object to a record, defaulting missing fields.
fn to_record(object: Object) -> ObjectRecord {
    ObjectRecord {
        key: object.key.unwrap_or_default(),
        size: object.size.map_or(0, |s| s.max(0) as u64),
        last_modified: object
            .last_modified
            .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
    }
}
