/*
 * Responsibility
 * - Row types shared by every SchoolStore backend
 */
use sqlx::FromRow;

use crate::services::auth::{Principal, Role};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    // canonical role name (STUDENT / TEACHER / MANAGER)
    pub role: String,
}

impl UserRow {
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    /// Principal handed to the token issuer at login.
    pub fn principal(&self) -> Principal {
        Principal::new(self.username.clone(), [self.role.clone()])
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub name: String,
    pub instructor_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct EnrollmentRow {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub course_id: i64,
    pub course_name: String,
}
