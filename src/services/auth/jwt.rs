use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::config::ConfigError;

/// Access tokens are HMAC-signed with a single process-wide secret.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// Symmetric key material derived once from the configured secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("alg", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl SigningKeys {
    /// An empty secret is a startup failure, never a per-request one.
    pub fn from_secret(secret: &[u8]) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}
