//! Error types for configuration and bucket listing.

use thiserror::Error;

/// Errors detected while loading configuration, before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Access key or secret key was not provided.
    #[error("Missing AWS_ACCESS_KEY_ID or AWS_SECRET_ACCESS_KEY in environment")]
    MissingCredentials,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ConfigError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCredentials => 2,
            Self::InvalidConfig { .. } => 1,
        }
    }
}

/// Errors raised by the listing service. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum ListError {
    /// The account-level bucket listing failed.
    #[error("Failed to list buckets: {message}")]
    ListBuckets { message: String },

    /// A page of a bucket's object listing could not be fetched.
    #[error("Failed to list objects in {bucket}: {message}")]
    ListObjects { bucket: String, message: String },
}
