use std::collections::BTreeSet;
use std::sync::Arc;

use jsonwebtoken::{Validation, errors::ErrorKind};

use crate::services::auth::claims::decode_claims;
use crate::services::auth::clock::Clock;
use crate::services::auth::jwt::{SIGNING_ALGORITHM, SigningKeys};
use crate::services::auth::principal::{Principal, authority_name};

/// Outcome of validating one credential header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid(Principal),
    Invalid(Rejection),
}

impl TokenVerdict {
    pub fn into_principal(self) -> Option<Principal> {
        match self {
            TokenVerdict::Valid(principal) => Some(principal),
            TokenVerdict::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenVerdict::Valid(_))
    }
}

/// Why a credential was not accepted. Only used for logging; every variant means "anonymous".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoCredential,
    WrongPrefix,
    BadSignature,
    MalformedPayload,
    Expired,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::NoCredential => "no_credential",
            Rejection::WrongPrefix => "wrong_prefix",
            Rejection::BadSignature => "bad_signature",
            Rejection::MalformedPayload => "malformed_payload",
            Rejection::Expired => "expired",
        }
    }

    /// Coarse category: `no_credential`, `malformed_credential` or `expired_credential`.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::NoCredential => "no_credential",
            Rejection::WrongPrefix | Rejection::BadSignature | Rejection::MalformedPayload => {
                "malformed_credential"
            }
            Rejection::Expired => "expired_credential",
        }
    }
}

/// Stateless access-token verifier.
///
/// header → prefix → signature → expiry → principal. Each step either passes or
/// ends in `Invalid`; nothing is retried and nothing escapes as an error.
#[derive(Clone)]
pub struct TokenValidator {
    keys: SigningKeys,
    validation: Validation,
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("prefix", &self.prefix)
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(keys: SigningKeys, prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked against the injected clock after decoding, with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        // Missing claims are reported by the claims codec instead.
        validation.required_spec_claims.clear();

        Self {
            keys,
            validation,
            prefix: prefix.into(),
            clock,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn validate(&self, header: Option<&str>) -> TokenVerdict {
        let raw = match header {
            Some(raw) if !raw.is_empty() => raw,
            _ => return TokenVerdict::Invalid(Rejection::NoCredential),
        };

        let Some(token) = raw.strip_prefix(self.prefix.as_str()) else {
            return TokenVerdict::Invalid(Rejection::WrongPrefix);
        };

        // jsonwebtoken recomputes the HMAC and compares it in constant time.
        let payload = match jsonwebtoken::decode::<serde_json::Value>(
            token,
            self.keys.decoding(),
            &self.validation,
        ) {
            Ok(data) => data.claims,
            Err(err) => {
                let rejection = match err.kind() {
                    ErrorKind::InvalidSignature => Rejection::BadSignature,
                    _ => Rejection::MalformedPayload,
                };
                return TokenVerdict::Invalid(rejection);
            }
        };

        let claims = match decode_claims(&payload) {
            Ok(claims) => claims,
            Err(_) => return TokenVerdict::Invalid(Rejection::MalformedPayload),
        };

        if claims.expires_at <= self.clock.now() {
            return TokenVerdict::Invalid(Rejection::Expired);
        }

        TokenVerdict::Valid(Principal {
            subject: claims.subject,
            roles: normalize_roles(&claims.roles_raw),
        })
    }
}

// The single place where canonical role names become authorities (`STUDENT` -> `ROLE_STUDENT`).
fn normalize_roles(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(authority_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::services::auth::clock::ManualClock;
    use crate::services::auth::token_issuer::TokenIssuer;

    const SECRET: &[u8] = b"testSecretKeyForJwtTokenProviderTesting";
    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        clock: Arc<ManualClock>,
        issuer: TokenIssuer,
        validator: TokenValidator,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(NOW));
        let keys = SigningKeys::from_secret(SECRET).expect("keys");
        Fixture {
            issuer: TokenIssuer::new(keys.clone(), 3600, clock.clone()),
            validator: TokenValidator::new(keys, "Bearer ", clock.clone()),
            clock,
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    // Signs an arbitrary payload with the shared secret, bypassing the issuer.
    fn sign_raw(payload: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::new(SIGNING_ALGORITHM),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("sign")
    }

    #[test]
    fn issued_token_validates_with_prefixed_role() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&Principal::new("jane", ["STUDENT"]))
            .expect("issue");

        let verdict = f.validator.validate(Some(&bearer(&issued.token)));
        assert_eq!(
            verdict,
            TokenVerdict::Valid(Principal::new("jane", ["ROLE_STUDENT"]))
        );
    }

    #[test]
    fn multiple_roles_are_all_normalized() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&Principal::new("m", ["STUDENT", "TEACHER"]))
            .expect("issue");

        let principal = f
            .validator
            .validate(Some(&bearer(&issued.token)))
            .into_principal()
            .expect("valid");

        assert_eq!(principal.subject, "m");
        assert!(principal.has_authority("ROLE_STUDENT"));
        assert!(principal.has_authority("ROLE_TEACHER"));
        assert_eq!(principal.roles.len(), 2);
    }

    #[test]
    fn already_prefixed_roles_are_not_prefixed_twice() {
        let f = fixture();
        let token = sign_raw(json!({"sub": "testuser", "roles": "ROLE_STUDENT", "exp": NOW + 60}));

        let principal = f
            .validator
            .validate(Some(&bearer(&token)))
            .into_principal()
            .expect("valid");
        assert_eq!(principal.roles.iter().collect::<Vec<_>>(), vec!["ROLE_STUDENT"]);
    }

    #[test]
    fn token_becomes_invalid_once_clock_passes_expiry() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&Principal::new("jane", ["STUDENT"]))
            .expect("issue");
        let header = bearer(&issued.token);

        f.clock.set(issued.expires_at - 1);
        assert!(f.validator.validate(Some(&header)).is_valid());

        // exp <= now is expired, so the boundary second itself is rejected
        f.clock.set(issued.expires_at);
        assert_eq!(
            f.validator.validate(Some(&header)),
            TokenVerdict::Invalid(Rejection::Expired)
        );

        f.clock.advance(10);
        assert_eq!(
            f.validator.validate(Some(&header)),
            TokenVerdict::Invalid(Rejection::Expired)
        );
    }

    #[test]
    fn correctly_signed_but_past_expiry_is_invalid() {
        let f = fixture();
        let token = sign_raw(json!({"sub": "testuser", "roles": "STUDENT", "exp": NOW - 1}));

        assert_eq!(
            f.validator.validate(Some(&bearer(&token))),
            TokenVerdict::Invalid(Rejection::Expired)
        );
    }

    #[test]
    fn flipping_any_signature_character_invalidates() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&Principal::new("jane", ["STUDENT"]))
            .expect("issue");
        let (signed_part, signature) = issued.token.rsplit_once('.').expect("jws");

        for (i, original) in signature.char_indices() {
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered_sig = signature.to_string();
            tampered_sig.replace_range(i..i + 1, &replacement.to_string());
            let tampered = format!("{signed_part}.{tampered_sig}");

            let verdict = f.validator.validate(Some(&bearer(&tampered)));
            assert!(!verdict.is_valid(), "tampered position {i} was accepted");
        }
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let f = fixture();
        let foreign = jsonwebtoken::encode(
            &Header::new(SIGNING_ALGORITHM),
            &json!({"sub": "mallory", "roles": "MANAGER", "exp": NOW + 60}),
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .expect("sign");

        assert_eq!(
            f.validator.validate(Some(&bearer(&foreign))),
            TokenVerdict::Invalid(Rejection::BadSignature)
        );
    }

    #[test]
    fn raw_token_without_prefix_is_rejected() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&Principal::new("jane", ["STUDENT"]))
            .expect("issue");

        assert_eq!(
            f.validator.validate(Some(&issued.token)),
            TokenVerdict::Invalid(Rejection::WrongPrefix)
        );
    }

    #[test]
    fn basic_scheme_is_rejected() {
        let f = fixture();
        assert_eq!(
            f.validator.validate(Some("Basic abc123")),
            TokenVerdict::Invalid(Rejection::WrongPrefix)
        );
    }

    #[test]
    fn absent_or_empty_header_is_no_credential() {
        let f = fixture();
        assert_eq!(
            f.validator.validate(None),
            TokenVerdict::Invalid(Rejection::NoCredential)
        );
        assert_eq!(
            f.validator.validate(Some("")),
            TokenVerdict::Invalid(Rejection::NoCredential)
        );
    }

    #[test]
    fn garbage_after_prefix_is_malformed() {
        let f = fixture();
        assert_eq!(
            f.validator.validate(Some("Bearer InvalidTokenFormat")),
            TokenVerdict::Invalid(Rejection::MalformedPayload)
        );
        assert_eq!(
            f.validator.validate(Some("Bearer ")),
            TokenVerdict::Invalid(Rejection::MalformedPayload)
        );
    }

    #[test]
    fn signed_payload_missing_subject_is_malformed() {
        let f = fixture();
        let token = sign_raw(json!({"roles": "STUDENT", "exp": NOW + 60}));

        assert_eq!(
            f.validator.validate(Some(&bearer(&token))),
            TokenVerdict::Invalid(Rejection::MalformedPayload)
        );
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let f = fixture();
        let token = jsonwebtoken::encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &json!({"sub": "jane", "roles": "STUDENT", "exp": NOW + 60}),
            &EncodingKey::from_secret(SECRET),
        )
        .expect("sign");

        assert!(!f.validator.validate(Some(&bearer(&token))).is_valid());
    }

    #[test]
    fn empty_role_list_is_forwarded_as_empty_set() {
        let f = fixture();
        let token = sign_raw(json!({"sub": "nobody", "roles": "", "exp": NOW + 60}));

        let principal = f
            .validator
            .validate(Some(&bearer(&token)))
            .into_principal()
            .expect("valid");
        assert!(principal.roles.is_empty());
    }

    #[test]
    fn validation_is_repeatable() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&Principal::new("jane", ["STUDENT"]))
            .expect("issue");
        let header = bearer(&issued.token);

        let first = f.validator.validate(Some(&header));
        let second = f.validator.validate(Some(&header));
        assert_eq!(first, second);
    }

    #[test]
    fn rejection_kinds_group_into_three_categories() {
        assert_eq!(Rejection::NoCredential.kind(), "no_credential");
        assert_eq!(Rejection::WrongPrefix.kind(), "malformed_credential");
        assert_eq!(Rejection::BadSignature.kind(), "malformed_credential");
        assert_eq!(Rejection::MalformedPayload.kind(), "malformed_credential");
        assert_eq!(Rejection::Expired.kind(), "expired_credential");
    }

    #[test]
    fn header_must_be_exactly_prefix_then_token() {
        let f = fixture();
        let issued = f
            .issuer
            .issue(&Principal::new("jane", ["STUDENT"]))
            .expect("issue");

        for header in [
            format!("Bearer  {}", issued.token),
            format!("Bearer {} ", issued.token),
            format!("Bearer {}\t", issued.token),
        ] {
            assert!(
                !f.validator.validate(Some(&header)).is_valid(),
                "{header:?} was accepted"
            );
        }
    }

    const CANONICAL_ROLES: [&str; 3] = ["STUDENT", "TEACHER", "MANAGER"];

    fn subject() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9 ._@-]{0,31}"
    }

    fn canonical_roles() -> impl Strategy<Value = Vec<&'static str>> {
        prop::sample::subsequence(CANONICAL_ROLES.to_vec(), 1..=3).prop_shuffle()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Any principal comes back with the same subject and every role prefixed once,
        /// whatever order its roles were given in.
        #[test]
        fn issued_tokens_round_trip(subject in subject(), roles in canonical_roles()) {
            let f = fixture();
            let issued = f.issuer.issue(&Principal::new(subject.clone(), roles.clone())).expect("issue");

            let expected = Principal::new(subject, roles.iter().map(|r| authority_name(r)));
            prop_assert_eq!(
                f.validator.validate(Some(&bearer(&issued.token))),
                TokenVerdict::Valid(expected)
            );
        }

        #[test]
        fn tokens_issued_in_any_role_order_are_identical(roles in canonical_roles()) {
            let f = fixture();
            let mut sorted = roles.clone();
            sorted.sort_unstable();

            let shuffled = f.issuer.issue(&Principal::new("jane", roles)).expect("issue");
            let ordered = f.issuer.issue(&Principal::new("jane", sorted)).expect("issue");
            prop_assert_eq!(shuffled.token, ordered.token);
        }

        #[test]
        fn any_token_past_expiry_is_expired(
            subject in subject(),
            roles in canonical_roles(),
            overrun in 0i64..10_000_000,
        ) {
            let f = fixture();
            let issued = f.issuer.issue(&Principal::new(subject, roles)).expect("issue");

            f.clock.set(issued.expires_at + overrun);
            prop_assert_eq!(
                f.validator.validate(Some(&bearer(&issued.token))),
                TokenVerdict::Invalid(Rejection::Expired)
            );
        }

        #[test]
        fn any_signed_payload_with_past_exp_is_expired(age in 0i64..10_000_000) {
            let f = fixture();
            let token = sign_raw(json!({"sub": "jane", "roles": "STUDENT", "exp": NOW - age}));

            prop_assert_eq!(
                f.validator.validate(Some(&bearer(&token))),
                TokenVerdict::Invalid(Rejection::Expired)
            );
        }

        #[test]
        fn raw_tokens_without_prefix_are_rejected(subject in subject(), roles in canonical_roles()) {
            let f = fixture();
            let issued = f.issuer.issue(&Principal::new(subject, roles)).expect("issue");

            prop_assert_eq!(
                f.validator.validate(Some(&issued.token)),
                TokenVerdict::Invalid(Rejection::WrongPrefix)
            );
        }

        #[test]
        fn changing_any_token_character_invalidates(
            subject in subject(),
            roles in canonical_roles(),
            position in any::<prop::sample::Index>(),
            replacement in "[A-Za-z0-9_-]",
        ) {
            let f = fixture();
            let issued = f.issuer.issue(&Principal::new(subject, roles)).expect("issue");

            let mut chars: Vec<char> = issued.token.chars().collect();
            let i = position.index(chars.len());
            let replacement = replacement.chars().next().expect("one char");
            prop_assume!(chars[i] != '.' && chars[i] != replacement);
            chars[i] = replacement;
            let tampered: String = chars.into_iter().collect();

            prop_assert!(!f.validator.validate(Some(&bearer(&tampered))).is_valid());
        }

        /// Whatever role names reach the issuer, a token is either refused or
        /// carries exactly those roles back.
        #[test]
        fn issued_roles_never_change_meaning(
            roles in prop::collection::btree_set("[A-Z_ ,\t]{0,12}", 1..4),
        ) {
            let f = fixture();
            let principal = Principal::new("jane", roles.clone());

            if let Ok(issued) = f.issuer.issue(&principal) {
                let expected = Principal::new("jane", roles.iter().map(|r| authority_name(r)));
                prop_assert_eq!(
                    f.validator.validate(Some(&bearer(&issued.token))),
                    TokenVerdict::Valid(expected)
                );
            }
        }
    }
}
