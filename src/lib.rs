//! Validation of [ID tokens](https://learn.microsoft.com/en-us/entra/identity-platform/id-tokens) issued by the
//! Microsoft identity platform (v2.0 endpoint).
//!
//! ## Overview
//!
//! An ID token is a [JSON Web Token (JWT)](https://datatracker.ietf.org/doc/html/rfc7519) signed with one of the
//! provider's RSA keys. The token only names its signing key (`kid` or `x5t` header parameter), the keys themselves are
//! published as a [JSON Web Key (JWK)](https://datatracker.ietf.org/doc/html/rfc7517) set whose location is listed in
//! the provider's OpenID configuration document.
//!
//! [`Validator::check`] runs the whole procedure for a token:
//!
//! 1. Split the token and decode its header, nothing else is trusted yet.
//! 2. Check that the header announces a `JWT` signed with `RS256` and names exactly one key.
//! 3. Resolve the key from the cached JWK set, fetching `.well-known/openid-configuration` and then the `jwks_uri` if
//!    the cache is empty or stale.
//! 4. Verify the signature with that key.
//! 5. Decode the claims and check issuer, audience, expiry and not-before, in that order.
//!
//! ## Features
//!
//! - **Caching**: The JWK set is cached for a configurable time (one hour by default). Concurrent checks hitting a
//!   stale cache share a single refresh.
//! - **Algorithm pinning**: Only `RS256` is accepted, whatever the token header claims.
//! - **Middleware**: [`AuthorizationLayer`] protects `axum` routes and hands the validated [`Claims`] to handlers.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use axum::{routing::get, Extension};
//! use ms_id_token::{AuthorizationLayer, Claims, Validator, ValidatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let validator = Validator::new(ValidatorConfig::default().with_expiry(Duration::from_secs(1800)));
//!
//!     let router = axum::Router::new()
//!         .route("/me", get(|Extension(claims): Extension<Claims>| async move { claims.sub }))
//!         .layer(AuthorizationLayer::new(
//!             Arc::new(validator),
//!             "6731de76-14a6-49ae-97bc-6eba6914391e".to_string(),
//!         ));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod authorization;
pub mod claims;
pub mod key_resolver;
pub mod token;

pub use authorization::AuthorizationLayer;
pub use claims::{ClaimVerifier, Claims};
pub use clock::{Clock, SystemClock};
pub use config::{ValidatorConfig, MS_CONFIG_URL};
pub use error::Error;
pub use jwk_set::KeyIdentifier;
pub use validator::Validator;

mod clock;
mod config;
mod error;
mod jwk_set;
mod jwks_cache;
mod oidc;
mod validator;

#[cfg(test)]
mod testing;
