/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - store: SchoolStore, token issuer/validator, route policy, credential header name
 * - Clone is cheap (everything inside is Arc / small)
 */
use std::sync::Arc;

use axum::http::HeaderName;

use crate::middleware::auth::policy::RolePolicy;
use crate::repos::SchoolStore;
use crate::services::auth::{TokenIssuer, TokenServices, TokenValidator};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SchoolStore>,
    pub issuer: Arc<TokenIssuer>,
    pub validator: Arc<TokenValidator>,
    pub policy: Arc<RolePolicy>,
    pub credential_header: HeaderName,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SchoolStore>,
        tokens: TokenServices,
        policy: RolePolicy,
        credential_header: HeaderName,
    ) -> Self {
        Self {
            store,
            issuer: tokens.issuer,
            validator: tokens.validator,
            policy: Arc::new(policy),
            credential_header,
        }
    }
}
