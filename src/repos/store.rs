//! Storage interface used by the HTTP handlers.
use async_trait::async_trait;

use crate::repos::error::RepoResult;
use crate::repos::models::{CourseRow, EnrollmentRow, NewUser, UserRow};

/// Users, courses and enrollments.
///
/// Implementations must be safe to share across requests (`Arc<dyn SchoolStore>`).
#[async_trait]
pub trait SchoolStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Returns `Conflict("user")` when the username is taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<UserRow>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRow>>;
    async fn get_user(&self, user_id: i64) -> RepoResult<Option<UserRow>>;
    async fn list_users(&self) -> RepoResult<Vec<UserRow>>;

    async fn create_course(&self, name: &str, instructor_id: Option<i64>)
    -> RepoResult<CourseRow>;
    async fn get_course(&self, course_id: i64) -> RepoResult<Option<CourseRow>>;
    async fn update_course(
        &self,
        course_id: i64,
        name: &str,
        instructor_id: Option<i64>,
    ) -> RepoResult<Option<CourseRow>>;
    // Also removes the course's enrollments.
    async fn delete_course(&self, course_id: i64) -> RepoResult<bool>;
    async fn list_courses(&self) -> RepoResult<Vec<CourseRow>>;

    // Returns `Conflict("enrollment")` when the student is already enrolled.
    async fn create_enrollment(&self, student_id: i64, course_id: i64)
    -> RepoResult<EnrollmentRow>;
    async fn courses_of_student(&self, student_id: i64) -> RepoResult<Vec<CourseRow>>;
    // Distinct students across every course taught by the instructor.
    async fn students_of_instructor(&self, instructor_id: i64) -> RepoResult<Vec<UserRow>>;
    async fn list_enrollments(&self) -> RepoResult<Vec<EnrollmentRow>>;
}
