use axum::{
    Json,
    extract::{Path, State},
};

use crate::{api::dto::users::UserResponse, error::AppError, state::AppState};

pub async fn students_of_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = state.store.students_of_instructor(teacher_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
