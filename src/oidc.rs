use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::jwk_set::KeySet;
use crate::Error;

/// Client for the two-step key discovery of an OpenID Connect provider.
///
/// The configuration document is requested anew on every key fetch, only the resulting key set is cached (see
/// [`crate::jwks_cache`]).
#[derive(Debug, Clone)]
pub struct OidcProvider {
    config_url: String,
    http_client: Client,
    timeout: Duration,
}

impl OidcProvider {
    pub fn new(config_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            config_url: config_url.into(),
            http_client: Client::new(),
            timeout,
        }
    }

    pub async fn configuration(&self) -> Result<OpenIdConfiguration, Error> {
        let response = self
            .http_client
            .get(&self.config_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                warn!(config_url = %self.config_url, error = %err, "failed to request OpenID configuration");
                Error::ConfigFetchFailed(Some(err))
            })?;

        if !response.status().is_success() {
            warn!(
                config_url = %self.config_url,
                status = %response.status(),
                "OpenID configuration endpoint returned error status"
            );
            return Err(Error::ConfigFetchFailed(None));
        }

        response.json::<OpenIdConfiguration>().await.map_err(|err| {
            warn!(config_url = %self.config_url, error = %err, "failed to parse OpenID configuration");
            Error::ConfigFetchFailed(Some(err))
        })
    }

    /// Resolves the `jwks_uri` from the configuration document and fetches the key set it points to.
    pub async fn jwks(&self) -> Result<KeySet, Error> {
        let jwks_url = self.configuration().await?.jwks_url()?;

        let response = self
            .http_client
            .get(jwks_url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                warn!(jwks_uri = %jwks_url, error = %err, "failed to request JWK set");
                Error::KeysFetchFailed(Some(err))
            })?;

        if !response.status().is_success() {
            warn!(
                jwks_uri = %jwks_url,
                status = %response.status(),
                "JWK set endpoint returned error status"
            );
            return Err(Error::KeysFetchFailed(None));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| Error::KeysFetchFailed(Some(err)))?;
        let jwk_set: JwkSet = serde_json::from_slice(&body).map_err(|err| {
            warn!(jwks_uri = %jwks_url, error = %err, "JWK set response is malformed");
            Error::BadKeySetFormat(Some(err))
        })?;

        info!(jwks_uri = %jwks_url, key_count = jwk_set.keys.len(), "fetched JWK set");
        Ok(jwk_set.into())
    }
}

/// Response payload of the provider's `.well-known/openid-configuration` endpoint.
///
/// Only covers those fields that are relevant in our context.
#[derive(Debug, Deserialize)]
pub struct OpenIdConfiguration {
    /// The URI where to retrieve the provider's signing keys.
    pub jwks_uri: Option<String>,
}

impl OpenIdConfiguration {
    fn jwks_url(&self) -> Result<Url, Error> {
        self.jwks_uri
            .as_deref()
            .and_then(|jwks_uri| Url::parse(jwks_uri).ok())
            .ok_or(Error::KeysUriNotFound)
    }
}
