/*
 * Responsibility
 * - The request-scoped authentication context seen by handlers and route policy
 * - The authorization filter creates one per request and stores it in request extensions
 *
 * Notes
 * - Token parsing and signature checks live in services::auth; this is only the contract type
 */
use crate::services::auth::Principal;

/// Who (if anyone) the current request is authenticated as.
///
/// - `None` means anonymous: no credential, or one that failed validation
/// - roles inside the principal are already `ROLE_`-prefixed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCtx {
    principal: Option<Principal>,
}

impl AuthCtx {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}
