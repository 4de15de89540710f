//! Elasticsearch client configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default cluster endpoint.
pub const DEFAULT_URL: &str = "https://localhost:9200";

/// Default timeout for HTTP requests: 60 seconds.
///
/// Pages of ten thousand documents routinely take several seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the Elasticsearch REST client.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ElasticsearchConfig {
    /// Cluster URL
    #[cfg_attr(
        feature = "config",
        arg(long = "es-url", env = "ES_URL", default_value = DEFAULT_URL)
    )]
    #[serde(default = "default_url")]
    pub es_url: String,

    /// Basic-auth username
    #[cfg_attr(feature = "config", arg(long = "es-username", env = "ES_USERNAME"))]
    #[serde(default)]
    pub es_username: Option<String>,

    /// Basic-auth password
    #[cfg_attr(
        feature = "config",
        arg(long = "es-password", env = "ES_PASSWORD", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub es_password: Option<String>,

    /// Accept self-signed or otherwise invalid TLS certificates
    #[cfg_attr(
        feature = "config",
        arg(long = "es-accept-invalid-certs", env = "ES_ACCEPT_INVALID_CERTS")
    )]
    #[serde(default)]
    pub es_accept_invalid_certs: bool,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "es-timeout", env = "ES_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "default_timeout_secs")]
    pub es_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(feature = "config", arg(long = "es-user-agent", env = "ES_USER_AGENT"))]
    #[serde(default)]
    pub es_user_agent: Option<String>,
}

fn default_url() -> String {
    DEFAULT_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl fmt::Debug for ElasticsearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticsearchConfig")
            .field("es_url", &self.es_url)
            .field("es_username", &self.es_username)
            .field("es_password", &self.es_password.as_ref().map(|_| "***"))
            .field("es_accept_invalid_certs", &self.es_accept_invalid_certs)
            .field("es_timeout", &self.es_timeout)
            .field("es_user_agent", &self.es_user_agent)
            .finish()
    }
}

impl ElasticsearchConfig {
    /// Creates a configuration for the given cluster URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            es_url: url.into(),
            es_username: None,
            es_password: None,
            es_accept_invalid_certs: false,
            es_timeout: DEFAULT_TIMEOUT_SECS,
            es_user_agent: None,
        }
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.es_username = Some(username.into());
        self.es_password = Some(password.into());
        self
    }

    /// Accepts invalid TLS certificates.
    #[must_use]
    pub fn with_invalid_certs_accepted(mut self) -> Self {
        self.es_accept_invalid_certs = true;
        self
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.es_timeout = timeout_secs;
        self
    }

    /// Returns the effective timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.es_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.es_timeout)
        }
    }

    /// Returns the effective user agent, using the default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.es_user_agent
            .clone()
            .unwrap_or_else(|| format!("pagebench/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Parses the cluster URL.
    pub fn url(&self) -> Result<Url, String> {
        let url = Url::parse(self.es_url.trim())
            .map_err(|e| format!("Invalid cluster URL '{}': {e}", self.es_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Cluster URL must use http or https, got '{}'",
                url.scheme()
            ));
        }

        Ok(url)
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        self.url()?;

        match (&self.es_username, &self.es_password) {
            (None, Some(_)) => return Err("A password was given without a username".to_string()),
            (Some(user), _) if user.is_empty() => {
                return Err("Username cannot be empty".to_string());
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ElasticsearchConfig::default();
        assert_eq!(config.es_url, DEFAULT_URL);
        assert_eq!(config.effective_timeout(), Duration::from_secs(60));
        assert!(!config.es_accept_invalid_certs);
        assert!(config.effective_user_agent().starts_with("pagebench/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ElasticsearchConfig::new("http://es.internal:9200")
            .with_credentials("elastic", "secret")
            .with_invalid_certs_accepted()
            .with_timeout(0);

        assert_eq!(config.es_username.as_deref(), Some("elastic"));
        assert!(config.es_accept_invalid_certs);
        assert_eq!(
            config.effective_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ElasticsearchConfig::default().with_credentials("elastic", "hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_validation() {
        assert!(ElasticsearchConfig::new("not a url").validate().is_err());
        assert!(ElasticsearchConfig::new("ftp://localhost").validate().is_err());

        let mut orphan_password = ElasticsearchConfig::default();
        orphan_password.es_password = Some("secret".into());
        assert!(orphan_password.validate().is_err());

        let empty_user = ElasticsearchConfig::default().with_credentials("", "secret");
        assert!(empty_user.validate().is_err());
    }

    #[test]
    fn test_password_is_never_serialized() {
        let config = ElasticsearchConfig::default().with_credentials("elastic", "hunter2");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
