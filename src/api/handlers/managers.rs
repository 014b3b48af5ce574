/*
 * Responsibility
 * - /api/manager: enrollment and user listings, course administration
 * - Course mutations are logged with the acting manager
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::{
        dto::{
            courses::{CourseRequest, CourseResponse},
            enrollments::EnrollmentResponse,
            users::UserResponse,
        },
        extractors::Authenticated,
    },
    error::AppError,
    services::auth::Role,
    state::AppState,
};

pub async fn list_enrollments(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentResponse>>, AppError> {
    let rows = state.store.list_enrollments().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = state.store.list_users().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn create_course(
    State(state): State<AppState>,
    Authenticated(manager): Authenticated,
    Json(req): Json<CourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;
    ensure_instructor(&state, req.instructor_id).await?;

    let row = state
        .store
        .create_course(req.name.trim(), req.instructor_id)
        .await?;

    tracing::info!(course_id = row.id, by = %manager.subject, "course created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_course(
    State(state): State<AppState>,
    Authenticated(manager): Authenticated,
    Path(course_id): Path<i64>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;
    ensure_instructor(&state, req.instructor_id).await?;

    let row = state
        .store
        .update_course(course_id, req.name.trim(), req.instructor_id)
        .await?
        .ok_or(AppError::not_found("course"))?;

    tracing::info!(course_id, by = %manager.subject, "course updated");
    Ok(Json(row.into()))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Authenticated(manager): Authenticated,
    Path(course_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_course(course_id).await? {
        return Err(AppError::not_found("course"));
    }

    tracing::info!(course_id, by = %manager.subject, "course deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_instructor(state: &AppState, instructor_id: Option<i64>) -> Result<(), AppError> {
    let Some(id) = instructor_id else {
        return Ok(());
    };

    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or(AppError::not_found("instructor"))?;
    if user.role() != Some(Role::Teacher) {
        return Err(AppError::bad_request(
            "NOT_A_TEACHER",
            format!("user {id} is not a teacher"),
        ));
    }
    Ok(())
}
