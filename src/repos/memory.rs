//! In-process SchoolStore for development runs without `DATABASE_URL`, and for tests.
use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::models::{CourseRow, EnrollmentRow, NewUser, UserRow};
use crate::repos::store::SchoolStore;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRow>,
    courses: Vec<CourseRow>,
    // (id, student_id, course_id)
    enrollments: Vec<(i64, i64, i64)>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, user_id: i64) -> Option<&UserRow> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn course(&self, course_id: i64) -> Option<&CourseRow> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    fn enrollment_row(&self, id: i64, student_id: i64, course_id: i64) -> Option<EnrollmentRow> {
        let student = self.user(student_id)?;
        let course = self.course(course_id)?;
        Some(EnrollmentRow {
            id,
            student_id,
            student_name: student.name.clone(),
            course_id,
            course_name: course.name.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchoolStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<UserRow> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Conflict("user"));
        }

        let row = UserRow {
            id: tables.next_id(),
            name: user.name,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_user(&self, user_id: i64) -> RepoResult<Option<UserRow>> {
        Ok(self.tables.read().await.user(user_id).cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<UserRow>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn create_course(
        &self,
        name: &str,
        instructor_id: Option<i64>,
    ) -> RepoResult<CourseRow> {
        let mut tables = self.tables.write().await;
        let row = CourseRow {
            id: tables.next_id(),
            name: name.to_string(),
            instructor_id,
        };
        tables.courses.push(row.clone());
        Ok(row)
    }

    async fn get_course(&self, course_id: i64) -> RepoResult<Option<CourseRow>> {
        Ok(self.tables.read().await.course(course_id).cloned())
    }

    async fn update_course(
        &self,
        course_id: i64,
        name: &str,
        instructor_id: Option<i64>,
    ) -> RepoResult<Option<CourseRow>> {
        let mut tables = self.tables.write().await;
        let Some(course) = tables.courses.iter_mut().find(|c| c.id == course_id) else {
            return Ok(None);
        };
        course.name = name.to_string();
        course.instructor_id = instructor_id;
        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, course_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.courses.len();
        tables.courses.retain(|c| c.id != course_id);
        let deleted = tables.courses.len() < before;
        if deleted {
            tables.enrollments.retain(|(_, _, c)| *c != course_id);
        }
        Ok(deleted)
    }

    async fn list_courses(&self) -> RepoResult<Vec<CourseRow>> {
        Ok(self.tables.read().await.courses.clone())
    }

    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> RepoResult<EnrollmentRow> {
        let mut tables = self.tables.write().await;
        if tables
            .enrollments
            .iter()
            .any(|(_, s, c)| *s == student_id && *c == course_id)
        {
            return Err(RepoError::Conflict("enrollment"));
        }

        // Mirrors the foreign keys of the SQL schema.
        if tables.user(student_id).is_none() {
            return Err(RepoError::MissingReference("student"));
        }
        if tables.course(course_id).is_none() {
            return Err(RepoError::MissingReference("course"));
        }

        let id = tables.next_id();
        let row = tables
            .enrollment_row(id, student_id, course_id)
            .ok_or(RepoError::MissingReference("course"))?;
        tables.enrollments.push((id, student_id, course_id));
        Ok(row)
    }

    async fn courses_of_student(&self, student_id: i64) -> RepoResult<Vec<CourseRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .filter(|(_, s, _)| *s == student_id)
            .filter_map(|(_, _, c)| tables.course(*c).cloned())
            .collect())
    }

    async fn students_of_instructor(&self, instructor_id: i64) -> RepoResult<Vec<UserRow>> {
        let tables = self.tables.read().await;
        let taught: BTreeSet<i64> = tables
            .courses
            .iter()
            .filter(|c| c.instructor_id == Some(instructor_id))
            .map(|c| c.id)
            .collect();

        let student_ids: BTreeSet<i64> = tables
            .enrollments
            .iter()
            .filter(|(_, _, c)| taught.contains(c))
            .map(|(_, s, _)| *s)
            .collect();

        Ok(student_ids
            .into_iter()
            .filter_map(|id| tables.user(id).cloned())
            .collect())
    }

    async fn list_enrollments(&self) -> RepoResult<Vec<EnrollmentRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .filter_map(|(id, s, c)| tables.enrollment_row(*id, *s, *c))
            .collect())
    }
}
