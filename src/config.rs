use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Discovery document of the Microsoft identity platform, valid for all tenants.
pub const MS_CONFIG_URL: &str =
    "https://login.microsoftonline.com/common/v2.0/.well-known/openid-configuration";

/// Default lifetime of a cached JWK set, in seconds.
pub const DEFAULT_KEYS_EXPIRY: u64 = 3600;

/// Default timeout applied to each request to the identity provider, in seconds.
pub const DEFAULT_HTTP_TIMEOUT: u64 = 10;

/// Settings of a [`Validator`](crate::Validator).
///
/// Can be deserialized from any serde format; missing fields take their defaults:
///
/// ```rust
/// use ms_id_token::ValidatorConfig;
///
/// let config: ValidatorConfig = serde_json::from_str(r#"{ "expiry": 1800 }"#).unwrap();
/// assert_eq!(config.expiry, 1800);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Seconds after which the cached JWK set is considered stale.
    pub expiry: u64,
    /// URL of the OpenID configuration document listing the `jwks_uri`.
    pub config_url: String,
    /// Per-request timeout for discovery and JWK set requests, given in seconds when deserialized. Zero selects the
    /// default.
    #[serde(deserialize_with = "duration_from_secs")]
    pub timeout: Duration,
    /// If set, only tokens whose issuer names this tenant are accepted.
    pub tenant: Option<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            expiry: DEFAULT_KEYS_EXPIRY,
            config_url: MS_CONFIG_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT),
            tenant: None,
        }
    }
}

impl ValidatorConfig {
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry.as_secs();
        self
    }

    /// Points discovery at another OpenID configuration document, e.g. a national cloud.
    pub fn with_config_url(mut self, config_url: impl Into<String>) -> Self {
        self.config_url = config_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Restricts accepted tokens to those issued by `tenant`.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub(crate) fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry)
    }

    /// Zero selects the default timeout.
    pub(crate) fn timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT)
        } else {
            self.timeout
        }
    }
}

fn duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
