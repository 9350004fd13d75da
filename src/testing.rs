//! Signing keys, tokens and a mock identity provider shared by the unit tests.

use std::sync::LazyLock;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::sign::Signer;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) const NOW: i64 = 1_700_000_000;
pub(crate) const TENANT: &str = "72f988bf-86f1-41af-91ab-2d7cd011db47";
pub(crate) const AUDIENCE: &str = "6731de76-14a6-49ae-97bc-6eba6914391e";
pub(crate) const KID: &str = "nOo3ZDrODXEK1jKWhXslHR_KXEg";
pub(crate) const THUMBPRINT: &str = "bW8ZcMjBCnJZS-ibX5UQDNStvx4";

pub(crate) static SIGNING_KEY: LazyLock<SigningKey> = LazyLock::new(SigningKey::generate);
pub(crate) static OTHER_KEY: LazyLock<SigningKey> = LazyLock::new(SigningKey::generate);

pub(crate) struct SigningKey {
    private_key: PKey<Private>,
    private_key_der: Vec<u8>,
    n: String,
    e: String,
}

impl SigningKey {
    fn generate() -> Self {
        let rsa = Rsa::generate(2048).unwrap();
        let private_key_der = rsa.private_key_to_der().unwrap();
        let n = URL_SAFE_NO_PAD.encode(rsa.n().to_vec());
        let e = URL_SAFE_NO_PAD.encode(rsa.e().to_vec());
        SigningKey {
            private_key: PKey::from_rsa(rsa).unwrap(),
            private_key_der,
            n,
            e,
        }
    }

    /// Public half of the key as published in a JWK set.
    pub(crate) fn jwk(&self, kid: &str) -> Value {
        json!({ "kty": "RSA", "use": "sig", "kid": kid, "x5t": THUMBPRINT, "n": self.n, "e": self.e })
    }

    /// RS256 token with `kid` in its header.
    pub(crate) fn token(&self, kid: &str, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        jsonwebtoken::encode(
            &header,
            claims,
            &EncodingKey::from_rsa_der(&self.private_key_der),
        )
        .unwrap()
    }

    /// RS256-signs an arbitrary header, e.g. one the validator must refuse.
    pub(crate) fn token_with_header(&self, header: &Value, claims: &Value) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        );
        let mut signer = Signer::new(MessageDigest::sha256(), &self.private_key).unwrap();
        signer.update(signing_input.as_bytes()).unwrap();
        let signature = signer.sign_to_vec().unwrap();
        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
    }
}

/// Claims of an ID token valid from `now - 60` until `now + 3600`.
pub(crate) fn claims_at(now: i64) -> Value {
    json!({
        "aud": AUDIENCE,
        "iss": format!("https://login.microsoftonline.com/{TENANT}/v2.0"),
        "iat": now - 60,
        "nbf": now - 60,
        "exp": now + 3600,
        "sub": "AAAAAAAAAAAAAAAAAAAAAIkzqFVrSaSaFHy782bbtaQ",
        "tid": TENANT,
        "oid": "00000000-0000-0000-66f3-3332eca7ea81",
        "preferred_username": "abeli@microsoft.com",
        "name": "Abe Lincoln",
        "ver": "2.0",
    })
}

/// Identity provider serving an OpenID configuration and a JWK set, each expected to be requested
/// `expected_fetches` times.
pub(crate) struct MockProvider {
    server: MockServer,
}

impl MockProvider {
    pub(crate) async fn start(keys: Vec<Value>, expected_fetches: u64) -> Self {
        Self::start_with_delay(keys, expected_fetches, Duration::ZERO).await
    }

    pub(crate) async fn start_with_delay(
        keys: Vec<Value>,
        expected_fetches: u64,
        delay: Duration,
    ) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/common/v2.0/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": "https://login.microsoftonline.com/{tenantid}/v2.0",
                "jwks_uri": format!("{}/common/discovery/v2.0/keys", server.uri()),
                "id_token_signing_alg_values_supported": ["RS256"],
            })))
            .expect(expected_fetches)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/common/discovery/v2.0/keys"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "keys": keys }))
                    .set_delay(delay),
            )
            .expect(expected_fetches)
            .mount(&server)
            .await;

        MockProvider { server }
    }

    /// Identity provider whose configuration endpoint answers with `status` after `delay`, expected to be requested
    /// `expected_fetches` times.
    pub(crate) async fn failing(status: u16, expected_fetches: u64, delay: Duration) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/common/v2.0/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(status).set_delay(delay))
            .expect(expected_fetches)
            .mount(&server)
            .await;

        MockProvider { server }
    }

    pub(crate) fn config_url(&self) -> String {
        format!(
            "{}/common/v2.0/.well-known/openid-configuration",
            self.server.uri()
        )
    }
}
