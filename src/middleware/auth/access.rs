//! Authorization filter: validate the credential header and store an `AuthCtx` in request
//! extensions.
//!
//! - Runs once per request, before route policy.
//! - Never rejects: an absent, malformed or expired credential just leaves the request
//!   anonymous. Whether anonymous is good enough is decided by `policy`.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::services::auth::{Rejection, TokenVerdict};
use crate::state::AppState;

/// Wrap `router` with the authorization filter.
///
/// Apply it after `policy::apply` so that it ends up outside (runs first):
/// ```ignore
/// let router = middleware::auth::policy::apply(router, state.clone());
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, authorization_filter))
}

async fn authorization_filter(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let verdict = match req.headers().get(&state.credential_header) {
        None => state.validator.validate(None),
        Some(value) => match value.to_str() {
            Ok(raw) => state.validator.validate(Some(raw)),
            // non-visible-ASCII header value
            Err(_) => TokenVerdict::Invalid(Rejection::MalformedPayload),
        },
    };

    let auth_ctx = match verdict {
        TokenVerdict::Valid(principal) => {
            tracing::debug!(subject = %principal.subject, "credential accepted");
            AuthCtx::authenticated(principal)
        }
        TokenVerdict::Invalid(rejection) => {
            log_rejection(rejection);
            AuthCtx::anonymous()
        }
    };

    // middleware → extractor / policy handoff
    req.extensions_mut().insert(auth_ctx);

    next.run(req).await
}

fn log_rejection(rejection: Rejection) {
    match rejection {
        Rejection::NoCredential => {}
        // Basic credentials on the login route and stale tokens are routine.
        Rejection::WrongPrefix | Rejection::Expired => tracing::debug!(
            reason = rejection.as_str(),
            kind = rejection.kind(),
            "credential not accepted; continuing as anonymous"
        ),
        Rejection::BadSignature | Rejection::MalformedPayload => tracing::warn!(
            reason = rejection.as_str(),
            kind = rejection.kind(),
            "credential rejected; continuing as anonymous"
        ),
    }
}
