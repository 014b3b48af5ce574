//! Route policy: which paths need which role.
//!
//! Runs after the authorization filter and reads the `AuthCtx` it left behind.
//! Anonymous on a protected route → 401, authenticated without the role → 403.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{Principal, Role};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub prefix: &'static str,
    pub access: Access,
}

/// Ordered, first-match table of path prefixes.
#[derive(Debug, Clone)]
pub struct RolePolicy {
    rules: Vec<RouteRule>,
    fallback: Access,
}

impl RolePolicy {
    pub fn new(rules: Vec<RouteRule>, fallback: Access) -> Self {
        Self { rules, fallback }
    }

    /// Route table of the enrollment API.
    pub fn school_default() -> Self {
        let rule = |prefix, access| RouteRule { prefix, access };
        Self::new(
            vec![
                rule("/health", Access::Public),
                rule("/api/user/registration", Access::Public),
                rule("/api/user/login", Access::Public),
                rule("/api/student", Access::Role(Role::Student)),
                rule("/api/teacher", Access::Role(Role::Teacher)),
                rule("/api/manager", Access::Role(Role::Manager)),
                rule("/api/user", Access::Authenticated),
            ],
            Access::Authenticated,
        )
    }

    pub fn required(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| matches_prefix(path, rule.prefix))
            .map(|rule| rule.access)
            .unwrap_or(self.fallback)
    }

    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> Decision {
        match (self.required(path), principal) {
            (Access::Public, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (Access::Authenticated, Some(_)) => Decision::Allow,
            (Access::Role(role), Some(p)) if p.has_role(role) => Decision::Allow,
            (Access::Role(_), Some(_)) => Decision::Forbidden,
        }
    }
}

// "/api/student" matches "/api/student" and "/api/student/..." but not "/api/students".
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, enforce))
}

async fn enforce(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<AuthCtx>()
        .and_then(|ctx| ctx.principal());

    match state.policy.decide(req.uri().path(), principal) {
        Decision::Allow => Ok(next.run(req).await),
        Decision::Unauthenticated => Err(AppError::Unauthorized),
        Decision::Forbidden => {
            tracing::info!(path = %req.uri().path(), "forbidden: missing role");
            Err(AppError::Forbidden)
        }
    }
}
