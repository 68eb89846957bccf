//! Key-value export configuration.
//!
//! Every field can come from a command-line flag or an environment
//! variable; a flag wins when both are present. The API URL defaults to the
//! public Cloudflare endpoint.

use url::Url;

/// Default key-value API base URL.
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_TOKEN: &str = "MDIST_KV_API_TOKEN";
const ENV_ACCOUNT: &str = "MDIST_KV_ACCOUNT_ID";
const ENV_NAMESPACE: &str = "MDIST_KV_NAMESPACE_ID";
const ENV_API_URL: &str = "MDIST_KV_API_URL";
const ENV_TIMEOUT: &str = "MDIST_KV_TIMEOUT_SECS";

/// Connection settings for a key-value namespace.
///
/// Custom `Debug` implementation redacts `api_token`.
#[derive(Clone)]
pub struct KvConfig {
    /// API base URL.
    pub api_url: Url,
    /// Account that owns the namespace.
    pub account_id: String,
    /// Target namespace.
    pub namespace_id: String,
    /// Bearer token.
    pub api_token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for KvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvConfig")
            .field("api_url", &self.api_url)
            .field("account_id", &self.account_id)
            .field("namespace_id", &self.namespace_id)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Explicit values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct KvOverrides {
    pub api_url: Option<String>,
    pub account_id: Option<String>,
    pub namespace_id: Option<String>,
    pub api_token: Option<String>,
}

impl KvConfig {
    /// Build a configuration with the default timeout.
    pub fn new(
        api_url: Url,
        account_id: impl Into<String>,
        namespace_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            api_url,
            account_id: account_id.into(),
            namespace_id: namespace_id.into(),
            api_token: api_token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `MDIST_KV_API_TOKEN` (required)
    /// - `MDIST_KV_ACCOUNT_ID` (required)
    /// - `MDIST_KV_NAMESPACE_ID` (required)
    /// - `MDIST_KV_API_URL` (default: `https://api.cloudflare.com/client/v4`)
    /// - `MDIST_KV_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(KvOverrides::default())
    }

    /// Load configuration, preferring `overrides` over the environment.
    pub fn resolve(overrides: KvOverrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |var| std::env::var(var).ok())
    }

    fn resolve_with(
        overrides: KvOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_token = overrides
            .api_token
            .or_else(|| lookup(ENV_TOKEN))
            .ok_or(ConfigError::MissingToken)?;
        let account_id = overrides
            .account_id
            .or_else(|| lookup(ENV_ACCOUNT))
            .ok_or(ConfigError::MissingAccountId)?;
        let namespace_id = overrides
            .namespace_id
            .or_else(|| lookup(ENV_NAMESPACE))
            .ok_or(ConfigError::MissingNamespaceId)?;
        let raw_url = overrides
            .api_url
            .or_else(|| lookup(ENV_API_URL))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl(raw_url.clone(), e.to_string()))?;

        Ok(Self {
            api_url,
            account_id,
            namespace_id,
            api_token,
            timeout_secs: lookup(ENV_TIMEOUT)
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// The namespace bulk-write endpoint.
    pub fn bulk_endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/storage/kv/namespaces/{}/bulk",
            self.api_url.as_str().trim_end_matches('/'),
            self.account_id,
            self.namespace_id
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API token is required (--token or MDIST_KV_API_TOKEN)")]
    MissingToken,
    #[error("account identifier is required (--account-identifier or MDIST_KV_ACCOUNT_ID)")]
    MissingAccountId,
    #[error("namespace identifier is required (--namespace-identifier or MDIST_KV_NAMESPACE_ID)")]
    MissingNamespaceId,
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,
}
