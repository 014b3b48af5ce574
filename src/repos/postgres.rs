/*
 * Responsibility
 * - SchoolStore backed by Postgres (SQLx runtime queries)
 * - Unique violations are surfaced as RepoError::Conflict
 */
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::models::{CourseRow, EnrollmentRow, NewUser, UserRow};
use crate::repos::store::SchoolStore;

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl SchoolStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, username, password_hash, role
            "#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "user"))?;

        Ok(row)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, username, password_hash, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_user(&self, user_id: i64) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, username, password_hash, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_users(&self) -> RepoResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, username, password_hash, role
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create_course(
        &self,
        name: &str,
        instructor_id: Option<i64>,
    ) -> RepoResult<CourseRow> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            INSERT INTO courses (name, instructor_id)
            VALUES ($1, $2)
            RETURNING id, name, instructor_id
            "#,
        )
        .bind(name)
        .bind(instructor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_course(&self, course_id: i64) -> RepoResult<Option<CourseRow>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, name, instructor_id
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_course(
        &self,
        course_id: i64,
        name: &str,
        instructor_id: Option<i64>,
    ) -> RepoResult<Option<CourseRow>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            UPDATE courses
            SET name = $2, instructor_id = $3
            WHERE id = $1
            RETURNING id, name, instructor_id
            "#,
        )
        .bind(course_id)
        .bind(name)
        .bind(instructor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_course(&self, course_id: i64) -> RepoResult<bool> {
        // course_students rows go with it (ON DELETE CASCADE)
        let result = sqlx::query(
            r#"
            DELETE FROM courses
            WHERE id = $1
            "#,
        )
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_courses(&self) -> RepoResult<Vec<CourseRow>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, name, instructor_id
            FROM courses
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> RepoResult<EnrollmentRow> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO course_students (student_id, course_id)
                VALUES ($1, $2)
                RETURNING id, student_id, course_id
            )
            SELECT
                i.id, i.student_id, u.name AS student_name, i.course_id, c.name AS course_name
            FROM inserted i
            JOIN users u ON u.id = i.student_id
            JOIN courses c ON c.id = i.course_id
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "enrollment"))?;

        Ok(row)
    }

    async fn courses_of_student(&self, student_id: i64) -> RepoResult<Vec<CourseRow>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT c.id, c.name, c.instructor_id
            FROM course_students cs
            JOIN courses c ON c.id = cs.course_id
            WHERE cs.student_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn students_of_instructor(&self, instructor_id: i64) -> RepoResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT DISTINCT u.id, u.name, u.username, u.password_hash, u.role
            FROM course_students cs
            JOIN courses c ON c.id = cs.course_id
            JOIN users u ON u.id = cs.student_id
            WHERE c.instructor_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(instructor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_enrollments(&self) -> RepoResult<Vec<EnrollmentRow>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT
                cs.id, cs.student_id, u.name AS student_name, cs.course_id, c.name AS course_name
            FROM course_students cs
            JOIN users u ON u.id = cs.student_id
            JOIN courses c ON c.id = cs.course_id
            ORDER BY cs.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
