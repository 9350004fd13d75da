use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use url::Url;

use crate::Error;

/// Host of the Microsoft identity platform issuer, `https://login.microsoftonline.com/<tenant>/v2.0`.
pub const ISSUER_HOST: &str = "login.microsoftonline.com";

/// Claims of a validated ID token.
///
/// All fields the validator depends on are required; deserialization fails if any of them is missing or `null`.
/// Any other claim of the token is kept in `extra`.
///
/// `exp`, `nbf` and `iat` may carry a fraction of a second and are rounded up to whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
    #[serde(deserialize_with = "numeric_date")]
    pub nbf: i64,
    pub sub: String,
    pub iss: String,
    #[serde(deserialize_with = "numeric_date")]
    pub iat: i64,
    pub tid: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Tenant named by the issuer URL, if the issuer has the Microsoft v2.0 form.
    pub fn issuer_tenant(&self) -> Option<String> {
        let issuer = Url::parse(&self.iss).ok()?;
        if issuer.scheme() != "https" || issuer.host_str() != Some(ISSUER_HOST) {
            return None;
        }

        let mut segments = issuer.path_segments()?;
        match (segments.next(), segments.next(), segments.next()) {
            (Some(tenant), Some("v2.0"), None) if !tenant.is_empty() => Some(tenant.to_string()),
            _ => None,
        }
    }
}

/// Seconds since the epoch, integral or not. Rounding up keeps `exp <= now` and `nbf > now` exact for whole-second
/// `now`.
fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    if let Some(secs) = number.as_i64() {
        return Ok(secs);
    }
    match number.as_f64() {
        Some(secs) if secs.is_finite() => Ok(secs.ceil() as i64),
        _ => Err(D::Error::custom(format!("invalid NumericDate {number}"))),
    }
}

/// Checks decoded claims against the expected audience and the current time.
#[derive(Debug, Clone, Default)]
pub struct ClaimVerifier {
    tenant: Option<String>,
}

impl ClaimVerifier {
    /// A verifier that only accepts tokens issued by `tenant`, if given.
    pub fn new(tenant: Option<String>) -> Self {
        Self { tenant }
    }

    /// Checks structure, then audience, then expiry, then not-before, reporting the first failure.
    ///
    /// A token is valid from `nbf` (inclusive) up to `exp` (exclusive).
    pub fn verify(&self, claims: &Claims, expected_audience: &str, now: i64) -> Result<(), Error> {
        let issuer_tenant = claims.issuer_tenant().ok_or(Error::MalformedClaims)?;
        if let Some(tenant) = &self.tenant {
            if *tenant != issuer_tenant {
                return Err(Error::MalformedClaims);
            }
        }

        if claims.aud != expected_audience {
            return Err(Error::AudienceMismatch);
        }

        if claims.exp <= now {
            return Err(Error::TokenExpired);
        }

        if claims.nbf > now {
            return Err(Error::TokenNotYetValid);
        }

        Ok(())
    }
}
