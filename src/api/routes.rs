/*
 * Responsibility
 * - URL layout under /api
 * - Access per prefix is decided by middleware::auth::policy, not here
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use crate::api::handlers::{
    enrollments::enroll,
    managers::{create_course, delete_course, list_enrollments, list_users, update_course},
    students::courses_of_student,
    teachers::students_of_teacher,
    users::{list_courses, login, register},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/registration", post(register))
        .route("/user/login", get(login))
        .route("/user/courses", get(list_courses))
        .route("/user/enroll", post(enroll))
        .route("/student/courses/{student_id}", get(courses_of_student))
        .route("/student/enroll", post(enroll))
        .route("/teacher/students/{teacher_id}", get(students_of_teacher))
        .route("/manager/enrollments", get(list_enrollments))
        .route("/manager/users", get(list_users))
        .route("/manager/courses", post(create_course))
        .route(
            "/manager/courses/{course_id}",
            put(update_course).delete(delete_course),
        )
}
