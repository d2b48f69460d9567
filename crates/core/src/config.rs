//! Client configuration
//!
//! Connection settings for a store endpoint: base URL, account login, and the
//! fingerprint of the signing key. Built programmatically or from `MANTLE_*`
//! environment variables; nothing is read from or written to disk.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Environment variable holding the store base URL
pub const ENV_URL: &str = "MANTLE_URL";

/// Environment variable holding the account login
pub const ENV_ACCOUNT: &str = "MANTLE_ACCOUNT";

/// Environment variable holding the signing key fingerprint
pub const ENV_KEY_ID: &str = "MANTLE_KEY_ID";

/// Environment variable allowing insecure TLS connections
pub const ENV_INSECURE: &str = "MANTLE_INSECURE";

/// Timeout configuration for store requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    30000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            read_ms: default_read_timeout(),
        }
    }
}

/// Connection settings for one store endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Store base URL
    pub url: String,

    /// Account login owning the key
    pub account: String,

    /// Fingerprint identifying the signing key
    pub key_id: String,

    /// Request timeouts; `None` leaves transport defaults in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutConfig>,

    /// Allow insecure TLS connections
    #[serde(default)]
    pub insecure: bool,
}

impl ClientConfig {
    /// Start building a configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Build a configuration from `MANTLE_*` environment variables.
    ///
    /// `MANTLE_URL`, `MANTLE_ACCOUNT`, and `MANTLE_KEY_ID` are required;
    /// `MANTLE_INSECURE` (`1` or `true`) is optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name).ok_or_else(|| Error::Config(format!("{name} is not set")))
        };

        let insecure = lookup(ENV_INSECURE)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        ClientConfigBuilder::default()
            .url(require(ENV_URL)?)
            .account(require(ENV_ACCOUNT)?)
            .key_id(require(ENV_KEY_ID)?)
            .insecure(insecure)
            .build()
    }

    /// The key identifier sent in the authorization header:
    /// `/{account}/keys/{fingerprint}`
    pub fn signing_key_id(&self) -> String {
        format!("/{}/keys/{}", self.account, self.key_id)
    }

    /// The account's storage root path: `/{account}/stor`
    pub fn storage_root(&self) -> String {
        format!("/{}/stor", self.account)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    url: Option<String>,
    account: Option<String>,
    key_id: Option<String>,
    timeout: Option<TimeoutConfig>,
    insecure: bool,
}

impl ClientConfigBuilder {
    /// Set the store base URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the account login
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set the signing key fingerprint
    pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Set request timeouts
    pub fn timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Allow insecure TLS connections
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Validate and build the configuration.
    ///
    /// The URL must parse and use an `http`/`https` scheme; account and key
    /// fingerprint must be non-empty. A trailing slash on the URL is
    /// normalized away.
    pub fn build(self) -> Result<ClientConfig> {
        let url = self
            .url
            .ok_or_else(|| Error::Config("Store URL is required".into()))?;
        let url = url.trim_end_matches('/').to_string();

        let parsed = Url::parse(&url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::Config(format!(
                "Unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let account = self
            .account
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::Config("Account login is required".into()))?;

        let key_id = self
            .key_id
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("Key fingerprint is required".into()))?;

        Ok(ClientConfig {
            url,
            account,
            key_id,
            timeout: self.timeout,
            insecure: self.insecure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_builder() -> ClientConfigBuilder {
        ClientConfig::builder()
            .url("https://store.example.com")
            .account("ops")
            .key_id("9d:1c:f4:69:66:cb:bf:1a:40:b5:d2:c2:6a:0a:eb:2d")
    }

    #[test]
    fn test_builder_valid() {
        let config = valid_builder().build().unwrap();
        assert_eq!(config.url, "https://store.example.com");
        assert_eq!(config.account, "ops");
        assert!(!config.insecure);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = valid_builder().url("https://store.example.com/").build().unwrap();
        assert_eq!(config.url, "https://store.example.com");
    }

    #[test]
    fn test_builder_rejects_missing_fields() {
        assert!(ClientConfig::builder().build().is_err());
        assert!(
            ClientConfig::builder()
                .url("https://store.example.com")
                .account("ops")
                .build()
                .is_err()
        );
        assert!(valid_builder().account("").build().is_err());
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        assert!(valid_builder().url("not a url").build().is_err());
        assert!(valid_builder().url("ftp://store.example.com").build().is_err());
    }

    #[test]
    fn test_signing_key_id() {
        let config = valid_builder().key_id("aa:bb").build().unwrap();
        assert_eq!(config.signing_key_id(), "/ops/keys/aa:bb");
    }

    #[test]
    fn test_storage_root() {
        let config = valid_builder().build().unwrap();
        assert_eq!(config.storage_root(), "/ops/stor");
    }

    #[test]
    fn test_from_lookup() {
        let vars = [
            (ENV_URL, "https://store.example.com"),
            (ENV_ACCOUNT, "ops"),
            (ENV_KEY_ID, "aa:bb"),
            (ENV_INSECURE, "true"),
        ];
        let config = ClientConfig::from_lookup(|name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
        .unwrap();
        assert_eq!(config.account, "ops");
        assert!(config.insecure);
    }

    #[test]
    fn test_from_lookup_missing_var() {
        let result = ClientConfig::from_lookup(|name| {
            (name == ENV_URL).then(|| "https://store.example.com".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_timeout_defaults() {
        let timeout = TimeoutConfig::default();
        assert_eq!(timeout.connect_ms, 5000);
        assert_eq!(timeout.read_ms, 30000);
    }
}
