use std::sync::Arc;

use jsonwebtoken::Header;
use tracing::error;

use crate::error::AppError;
use crate::services::auth::claims::encode_claims;
use crate::services::auth::clock::Clock;
use crate::services::auth::jwt::{SIGNING_ALGORITHM, SigningKeys};
use crate::services::auth::principal::Principal;

/// A freshly signed access token and its validity window.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Signs access tokens for authenticated principals.
///
/// Immutable after construction; `issue` can run concurrently from any number of requests.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: SigningKeys,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(keys: SigningKeys, ttl_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Issue an access token.
    ///
    /// - `exp` is always `iat + ttl`
    /// - principals without a subject or without roles are refused (fail closed)
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, AppError> {
        if principal.subject.trim().is_empty() || principal.roles.is_empty() {
            error!(
                subject = %principal.subject,
                roles = principal.roles.len(),
                "refusing to issue a token without subject or roles"
            );
            return Err(AppError::Internal);
        }
        if let Some(bad) = principal.roles.iter().find(|r| !is_signable_role(r)) {
            error!(
                subject = %principal.subject,
                role = ?bad,
                "refusing to issue a token with a role that does not survive the comma-joined encoding"
            );
            return Err(AppError::Internal);
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at.saturating_add(self.ttl_seconds);
        let claims = encode_claims(principal, issued_at, expires_at);

        let mut header = Header::new(SIGNING_ALGORITHM);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &claims, self.keys.encoding()).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }
}

// Roles travel comma-joined and are split and trimmed on the way back.
fn is_signable_role(role: &str) -> bool {
    !role.is_empty() && !role.contains(',') && role.trim() == role
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{Validation, decode};

    use super::*;
    use crate::services::auth::clock::ManualClock;

    fn issuer(now: i64) -> TokenIssuer {
        let keys = SigningKeys::from_secret(b"issuer-test-secret").expect("keys");
        TokenIssuer::new(keys, 3600, Arc::new(ManualClock::new(now)))
    }

    #[test]
    fn expiry_is_issued_at_plus_ttl() {
        let issued = issuer(1_700_000_000)
            .issue(&Principal::new("jane", ["STUDENT"]))
            .expect("issue");

        assert_eq!(issued.issued_at, 1_700_000_000);
        assert_eq!(issued.expires_at, 1_700_003_600);
        assert_eq!(issued.token.split('.').count(), 3);
    }

    #[test]
    fn token_carries_comma_joined_canonical_roles() {
        let issued = issuer(chrono::Utc::now().timestamp())
            .issue(&Principal::new("adminuser", ["TEACHER", "STUDENT"]))
            .expect("issue");

        let keys = SigningKeys::from_secret(b"issuer-test-secret").expect("keys");
        let data = decode::<serde_json::Value>(
            &issued.token,
            keys.decoding(),
            &Validation::new(SIGNING_ALGORITHM),
        )
        .expect("decode");

        assert_eq!(data.claims["sub"], "adminuser");
        assert_eq!(data.claims["roles"], "STUDENT,TEACHER");
    }

    #[test]
    fn refuses_principal_without_roles() {
        let empty: [&str; 0] = [];
        let err = issuer(0).issue(&Principal::new("ghost", empty)).unwrap_err();
        assert!(matches!(err, AppError::Internal));
    }

    #[test]
    fn refuses_blank_subject() {
        let err = issuer(0)
            .issue(&Principal::new(" ", ["STUDENT"]))
            .unwrap_err();
        assert!(matches!(err, AppError::Internal));
    }

    #[test]
    fn refuses_role_containing_a_comma() {
        let err = issuer(0)
            .issue(&Principal::new("jane", ["STUDENT,MANAGER"]))
            .unwrap_err();
        assert!(matches!(err, AppError::Internal));
    }

    #[test]
    fn refuses_blank_role_entry() {
        let err = issuer(0)
            .issue(&Principal::new("jane", ["", "STUDENT"]))
            .unwrap_err();
        assert!(matches!(err, AppError::Internal));
    }

    #[test]
    fn refuses_role_with_surrounding_whitespace() {
        for role in [" TEACHER", "TEACHER ", "\tTEACHER"] {
            let err = issuer(0)
                .issue(&Principal::new("jane", [role]))
                .unwrap_err();
            assert!(matches!(err, AppError::Internal), "{role:?}");
        }
    }
}
