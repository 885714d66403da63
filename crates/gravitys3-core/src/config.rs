//! Audit configuration and endpoint resolution.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Primary endpoint, used for account-level calls and default-region buckets.
pub const DEFAULT_ENDPOINT: &str = "https://s3.wasabisys.com";

/// Region assumed when none is configured or a bucket reports none.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Location constraints that mean "the default region".
const DEFAULT_REGION_ALIASES: &[&str] = &["", DEFAULT_REGION, "US"];

/// Configuration for an audit run.
#[derive(Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AuditConfig {
    /// Access key id.
    pub access_key: String,

    /// Secret access key.
    pub secret_key: String,

    /// Base URL for account-level calls.
    #[builder(default = "DEFAULT_ENDPOINT.to_string()")]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Region used for signing account-level calls.
    #[builder(default = "DEFAULT_REGION.to_string()")]
    #[serde(default = "default_region")]
    pub region: String,

    /// Only audit these buckets (empty = all buckets).
    #[builder(default)]
    #[serde(default)]
    pub buckets: Vec<String>,

    /// Number of sample keys kept per bucket.
    #[builder(default = "20")]
    #[serde(default = "default_sample_cap")]
    pub sample_cap: usize,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_sample_cap() -> usize {
    20
}

impl std::fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("buckets", &self.buckets)
            .field("sample_cap", &self.sample_cap)
            .finish()
    }
}

impl AuditConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if !present(&self.access_key) || !present(&self.secret_key) {
            return Err(ConfigError::MissingCredentials.to_string());
        }
        if self.sample_cap == Some(0) {
            return Err("Sample cap must be at least 1".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if endpoint.is_empty() {
                return Err("Endpoint cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl AuditConfig {
    /// Create a new config builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Load configuration through a variable lookup.
    ///
    /// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `WASABI_ENDPOINT`
    /// and `AWS_DEFAULT_REGION`. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let (Some(access_key), Some(secret_key)) =
            (var("AWS_ACCESS_KEY_ID"), var("AWS_SECRET_ACCESS_KEY"))
        else {
            return Err(ConfigError::MissingCredentials);
        };

        let mut builder = Self::builder();
        builder.access_key(access_key).secret_key(secret_key);
        if let Some(endpoint) = var("WASABI_ENDPOINT") {
            builder.endpoint(endpoint);
        }
        if let Some(region) = var("AWS_DEFAULT_REGION") {
            builder.region(region);
        }
        builder.build().map_err(ConfigError::from)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Whether a bucket passes the configured name filter.
    pub fn includes_bucket(&self, name: &str) -> bool {
        self.buckets.is_empty() || self.buckets.iter().any(|b| b == name)
    }
}

impl From<AuditConfigBuilderError> for ConfigError {
    fn from(err: AuditConfigBuilderError) -> Self {
        match err {
            AuditConfigBuilderError::UninitializedField("access_key" | "secret_key") => {
                Self::MissingCredentials
            }
            AuditConfigBuilderError::ValidationError(message)
                if message == Self::MissingCredentials.to_string() =>
            {
                Self::MissingCredentials
            }
            other => Self::InvalidConfig {
                message: other.to_string(),
            },
        }
    }
}

/// Region and endpoint a bucket is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketLocation {
    pub region: String,
    pub endpoint: String,
}

impl BucketLocation {
    /// Resolve a bucket's location constraint to a region and endpoint.
    ///
    /// Absent constraints and the default-region aliases map to the primary
    /// endpoint; any other region maps to its regional host. The region is
    /// also the signing region, so the legacy `US` constraint becomes
    /// [`DEFAULT_REGION`].
    pub fn resolve(constraint: Option<&str>, primary_endpoint: &str) -> Self {
        match constraint {
            Some(region) if !DEFAULT_REGION_ALIASES.contains(&region) => Self {
                region: region.to_string(),
                endpoint: format!("https://s3.{region}.wasabisys.com"),
            },
            _ => Self::primary(primary_endpoint),
        }
    }

    /// The default region at the primary endpoint.
    pub fn primary(primary_endpoint: &str) -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: primary_endpoint.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_config_builder() {
        let config = AuditConfig::builder()
            .access_key("AK")
            .secret_key("SK")
            .sample_cap(5usize)
            .build()
            .unwrap();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.sample_cap, 5);
        assert!(config.buckets.is_empty());
    }

    #[test]
    fn test_builder_rejects_zero_sample_cap() {
        let result = AuditConfig::builder()
            .access_key("AK")
            .secret_key("SK")
            .sample_cap(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AuditConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AK"),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
        ]))
        .unwrap();

        assert_eq!(config.access_key, "AK");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.sample_cap, 20);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AuditConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AK"),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
            ("WASABI_ENDPOINT", "https://s3.eu-central-1.wasabisys.com"),
            ("AWS_DEFAULT_REGION", "eu-central-1"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "https://s3.eu-central-1.wasabisys.com");
        assert_eq!(config.region, "eu-central-1");
    }

    #[test]
    fn test_missing_credentials() {
        let err = AuditConfig::from_lookup(lookup(&[("AWS_ACCESS_KEY_ID", "AK")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);

        let err = AuditConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", ""),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
    }

    #[test]
    fn test_builder_missing_credentials_maps_to_config_error() {
        let err = AuditConfig::builder().access_key("AK").build().unwrap_err();
        assert_eq!(ConfigError::from(err), ConfigError::MissingCredentials);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuditConfig::builder()
            .access_key("AK")
            .secret_key("very-secret")
            .build()
            .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn test_bucket_filter() {
        let mut config = AuditConfig::builder()
            .access_key("AK")
            .secret_key("SK")
            .build()
            .unwrap();
        assert!(config.includes_bucket("anything"));

        config.buckets = vec!["media".to_string()];
        assert!(config.includes_bucket("media"));
        assert!(!config.includes_bucket("backups"));
    }

    #[test]
    fn test_resolve_default_region() {
        for constraint in [None, Some(""), Some("us-east-1"), Some("US")] {
            let location = BucketLocation::resolve(constraint, DEFAULT_ENDPOINT);
            assert_eq!(location.region, DEFAULT_REGION);
            assert_eq!(location.endpoint, DEFAULT_ENDPOINT);
        }
    }

    #[test]
    fn test_resolve_legacy_us_uses_configured_endpoint() {
        let location = BucketLocation::resolve(Some("US"), "http://localhost:4566");
        assert_eq!(location.region, "us-east-1");
        assert_eq!(location.endpoint, "http://localhost:4566");
    }

    #[test]
    fn test_resolve_regional() {
        let location = BucketLocation::resolve(Some("eu-central-1"), DEFAULT_ENDPOINT);
        assert_eq!(location.region, "eu-central-1");
        assert_eq!(location.endpoint, "https://s3.eu-central-1.wasabisys.com");
    }
}
