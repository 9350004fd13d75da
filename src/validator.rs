use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, KeyAlgorithm};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::{debug, warn};

use crate::claims::{ClaimVerifier, Claims};
use crate::clock::{Clock, SystemClock};
use crate::config::ValidatorConfig;
use crate::key_resolver::KeyResolver;
use crate::token;
use crate::Error;

/// Validates ID tokens issued by the Microsoft identity platform.
///
/// A validator keeps the provider's JWK set cached for [`ValidatorConfig::expiry`] seconds. Share one instance (e.g.
/// behind an [`Arc`]) between concurrent callers so they share that cache, too.
///
/// ```rust,no_run
/// use ms_id_token::{Validator, ValidatorConfig};
///
/// # async fn run(id_token: &str) -> Result<(), ms_id_token::Error> {
/// let validator = Validator::new(ValidatorConfig::default());
/// let claims = validator.check(id_token, "6731de76-14a6-49ae-97bc-6eba6914391e").await?;
/// println!("signed in: {} from tenant {}", claims.sub, claims.tid);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Validator {
    resolver: KeyResolver,
    verifier: ClaimVerifier,
    clock: Arc<dyn Clock>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a validator that takes the current time from `clock`.
    pub fn with_clock(config: ValidatorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            resolver: KeyResolver::new(&config, Arc::clone(&clock)),
            verifier: ClaimVerifier::new(config.tenant),
            clock,
        }
    }

    /// Verifies `token` and returns its claims if it was signed by the provider for `audience` and is currently valid.
    ///
    /// The signature is checked before any claim is looked at.
    pub async fn check(&self, token: &str, audience: &str) -> Result<Claims, Error> {
        match self.verify(token, audience).await {
            Ok(claims) => {
                debug!(sub = %claims.sub, tid = %claims.tid, "token validated");
                Ok(claims)
            }
            Err(err) => {
                warn!(error = %err, "token rejected");
                Err(err)
            }
        }
    }

    /// Number of keys in the cached JWK set.
    pub async fn cached_key_count(&self) -> usize {
        self.resolver.cached_key_count().await
    }

    async fn verify(&self, token: &str, audience: &str) -> Result<Claims, Error> {
        let parsed = token::parse(token)?;
        let jwk = self.resolver.resolve(&parsed.header).await?;
        let payload = verify_signature(token, &jwk)?;

        let claims: Claims = serde_json::from_value(payload).map_err(|_| Error::MalformedClaims)?;
        self.verifier.verify(&claims, audience, self.clock.now())?;
        Ok(claims)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

/// Verifies the RS256 signature of `token` with `jwk` and returns the decoded payload.
///
/// No claim is validated here, that is left to [`ClaimVerifier`].
fn verify_signature(token: &str, jwk: &Jwk) -> Result<Value, Error> {
    if let Some(key_algorithm) = &jwk.common.key_algorithm {
        if *key_algorithm != KeyAlgorithm::RS256 {
            return Err(Error::SignatureVerificationFailed(
                ErrorKind::InvalidAlgorithm.into(),
            ));
        }
    }
    let key = DecodingKey::from_jwk(jwk).map_err(Error::SignatureVerificationFailed)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;

    decode::<Value>(token, &key, &validation)
        .map(|token_data| token_data.claims)
        .map_err(Error::SignatureVerificationFailed)
}
