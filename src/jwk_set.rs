use jsonwebtoken::jwk::{Jwk, JwkSet};

/// Identifier of the signing key, taken from the token header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyIdentifier {
    /// `kid` header parameter.
    Kid(String),
    /// `x5t` header parameter, the SHA-1 thumbprint of the signing certificate.
    Thumbprint(String),
}

impl KeyIdentifier {
    /// Compares against the JWK's identifier of the same kind only.
    fn matches(&self, jwk: &Jwk) -> bool {
        let candidate = match self {
            KeyIdentifier::Kid(_) => jwk.common.key_id.as_deref(),
            KeyIdentifier::Thumbprint(_) => jwk.common.x509_sha1_fingerprint.as_deref(),
        };
        candidate == Some(self.value())
    }

    pub fn value(&self) -> &str {
        match self {
            KeyIdentifier::Kid(value) | KeyIdentifier::Thumbprint(value) => value,
        }
    }
}

/// The provider's published keys, in the order they were listed.
#[derive(Debug, Clone)]
pub struct KeySet(JwkSet);

impl KeySet {
    pub fn find(&self, key_identifier: &KeyIdentifier) -> Option<&Jwk> {
        self.0.keys.iter().find(|jwk| key_identifier.matches(jwk))
    }

    pub fn len(&self) -> usize {
        self.0.keys.len()
    }
}

impl From<JwkSet> for KeySet {
    fn from(jwk_set: JwkSet) -> Self {
        KeySet(jwk_set)
    }
}
