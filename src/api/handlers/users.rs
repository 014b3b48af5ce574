/*
 * Responsibility
 * - /api/user: registration, login (token issuance), course catalogue
 * - Password hashing runs on the blocking pool
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    api::{
        dto::{
            courses::CourseResponse,
            users::{LoginResponse, RegisterRequest, UserResponse},
        },
        extractors::AuthCtx,
    },
    error::AppError,
    repos::{NewUser, UserRow},
    services::{
        auth::Role,
        password::{hash_password, verify_password},
    },
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let username = req.username.trim().to_string();
    if state.store.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::conflict("user"));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing task failed");
            AppError::Internal
        })??;

    // Self-registration always yields a student.
    let row = state
        .store
        .create_user(NewUser {
            name: req.name.trim().to_string(),
            username,
            password_hash,
            role: Role::Student,
        })
        .await?;

    tracing::info!(user_id = row.id, username = %row.username, "user registered");
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Issue an access token.
///
/// - `Authorization: Basic` → username/password are checked against the store
/// - otherwise a caller already authenticated by bearer token gets a fresh token
/// - anything else → 401
pub async fn login(
    State(state): State<AppState>,
    auth: AuthCtx,
    headers: HeaderMap,
) -> Result<Json<LoginResponse>, AppError> {
    let user = match basic_credentials(&headers) {
        Some(Ok((username, password))) => authenticate(&state, &username, password).await?,
        Some(Err(())) => return Err(AppError::Unauthorized),
        None => {
            let principal = auth.principal().ok_or(AppError::Unauthorized)?;
            state
                .store
                .find_user_by_username(&principal.subject)
                .await?
                .ok_or(AppError::Unauthorized)?
        }
    };

    let issued = state.issuer.issue(&user.principal())?;
    tracing::info!(user_id = user.id, "token issued");

    Ok(Json(LoginResponse::new(user, issued)))
}

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let rows = state.store.list_courses().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn authenticate(
    state: &AppState,
    username: &str,
    password: String,
) -> Result<UserRow, AppError> {
    let Some(user) = state.store.find_user_by_username(username).await? else {
        tracing::debug!("login for unknown user");
        return Err(AppError::Unauthorized);
    };

    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification task failed");
            AppError::Internal
        })??;

    if !matches {
        tracing::debug!(user_id = user.id, "login with wrong password");
        return Err(AppError::Unauthorized);
    }
    Ok(user)
}

/// `None` when no Basic credentials were sent, `Some(Err)` when they are unreadable.
fn basic_credentials(headers: &HeaderMap) -> Option<Result<(String, String), ()>> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let parsed = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|decoded| {
            decoded
                .split_once(':')
                .map(|(user, pass)| (user.to_string(), pass.to_string()))
        })
        .ok_or(());
    Some(parsed)
}
