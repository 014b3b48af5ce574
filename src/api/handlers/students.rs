use axum::{
    Json,
    extract::{Path, State},
};

use crate::{api::dto::courses::CourseResponse, error::AppError, state::AppState};

/// Courses the student is enrolled in. Unknown students simply have none.
pub async fn courses_of_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let rows = state.store.courses_of_student(student_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
