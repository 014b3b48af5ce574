use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::dto::enrollments::{EnrollRequest, EnrollmentResponse},
    error::AppError,
    services::auth::Role,
    state::AppState,
};

/// POST /api/user/enroll and /api/student/enroll
pub async fn enroll(
    State(state): State<AppState>,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), AppError> {
    let student = state
        .store
        .get_user(req.student_id)
        .await?
        .ok_or(AppError::not_found("student"))?;
    if student.role() != Some(Role::Student) {
        return Err(AppError::bad_request(
            "NOT_A_STUDENT",
            format!("user {} is not a student", student.id),
        ));
    }

    state
        .store
        .get_course(req.course_id)
        .await?
        .ok_or(AppError::not_found("course"))?;

    let row = state
        .store
        .create_enrollment(req.student_id, req.course_id)
        .await?;

    tracing::info!(
        student_id = row.student_id,
        course_id = row.course_id,
        "student enrolled"
    );
    Ok((StatusCode::CREATED, Json(row.into())))
}
