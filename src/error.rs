use http::StatusCode;

/// Reasons a token check can fail.
///
/// Every variant is terminal for the [`Validator::check`](crate::Validator::check) call that produced it. Provider
/// side failures (see [`Error::is_provider_failure`]) are kept apart from problems with the token itself so callers
/// can tell an outage from a forged or stale credential.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("token must consist of three non-empty segments with a decodable header")]
    MalformedToken,
    #[error("token header has an unexpected typ, alg or key identifier")]
    MalformedHeader,
    #[error("token claims are incomplete or the issuer is not trusted")]
    MalformedClaims,
    #[error("failed to fetch OpenID configuration")]
    ConfigFetchFailed(#[source] Option<reqwest::Error>),
    #[error("OpenID configuration does not contain a usable jwks_uri")]
    KeysUriNotFound,
    #[error("failed to fetch JWK set")]
    KeysFetchFailed(#[source] Option<reqwest::Error>),
    #[error("JWK set response does not contain a valid keys list")]
    BadKeySetFormat(#[source] Option<serde_json::Error>),
    #[error("no key in the JWK set matches the token's key identifier")]
    KeyNotFound,
    #[error("token signature verification failed")]
    SignatureVerificationFailed(#[source] jsonwebtoken::errors::Error),
    #[error("token audience does not match")]
    AudienceMismatch,
    #[error("token has expired")]
    TokenExpired,
    #[error("token is not valid yet")]
    TokenNotYetValid,
}

impl Error {
    /// Whether the failure was caused by the identity provider rather than by the token.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::ConfigFetchFailed(_)
                | Error::KeysUriNotFound
                | Error::KeysFetchFailed(_)
                | Error::BadKeySetFormat(_)
        )
    }

    /// Copy of a provider failure without its underlying cause, handed to callers that waited on the failed refresh.
    pub(crate) fn without_source(&self) -> Option<Error> {
        match self {
            Error::ConfigFetchFailed(_) => Some(Error::ConfigFetchFailed(None)),
            Error::KeysUriNotFound => Some(Error::KeysUriNotFound),
            Error::KeysFetchFailed(_) => Some(Error::KeysFetchFailed(None)),
            Error::BadKeySetFormat(_) => Some(Error::BadKeySetFormat(None)),
            _ => None,
        }
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        if self.is_provider_failure() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::UNAUTHORIZED
        }
    }
}
