use std::sync::Arc;

use jsonwebtoken::jwk::Jwk;
use tracing::warn;

use crate::clock::Clock;
use crate::config::ValidatorConfig;
use crate::jwk_set::KeyIdentifier;
use crate::jwks_cache::KeyCache;
use crate::oidc::OidcProvider;
use crate::token::Header;
use crate::Error;

pub const TOKEN_TYPE: &str = "JWT";

/// The only signature algorithm accepted. There is no negotiation based on the token header.
pub const TOKEN_ALGORITHM: &str = "RS256";

/// Checks the pinned `typ` and `alg` values and picks the single key identifier the header carries.
pub fn key_identifier(header: &Header) -> Result<KeyIdentifier, Error> {
    if header.typ.as_deref() != Some(TOKEN_TYPE) || header.alg.as_deref() != Some(TOKEN_ALGORITHM) {
        return Err(Error::MalformedHeader);
    }

    match (&header.kid, &header.x5t) {
        (Some(kid), None) => Ok(KeyIdentifier::Kid(kid.clone())),
        (None, Some(x5t)) => Ok(KeyIdentifier::Thumbprint(x5t.clone())),
        _ => Err(Error::MalformedHeader),
    }
}

/// Looks up the provider's signing key for a token header.
#[derive(Debug)]
pub struct KeyResolver {
    provider: OidcProvider,
    cache: KeyCache,
    clock: Arc<dyn Clock>,
}

impl KeyResolver {
    pub fn new(config: &ValidatorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider: OidcProvider::new(config.config_url.clone(), config.timeout()),
            cache: KeyCache::new(config.expiry()),
            clock,
        }
    }

    pub async fn resolve(&self, header: &Header) -> Result<Jwk, Error> {
        let key_identifier = key_identifier(header)?;

        let key_set = self
            .cache
            .get_or_refresh(self.clock.as_ref(), || self.provider.jwks())
            .await?;

        key_set.find(&key_identifier).cloned().ok_or_else(|| {
            warn!(key_id = key_identifier.value(), "no matching key in JWK set");
            Error::KeyNotFound
        })
    }

    pub async fn cached_key_count(&self) -> usize {
        self.cache.key_count().await
    }
}
