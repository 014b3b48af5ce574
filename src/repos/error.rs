/**
 * Responsibility
 * - What the repo layer tells its callers when something goes wrong
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(&'static str),
    // A foreign key points at a row that does not exist (anymore).
    #[error("missing reference: {0}")]
    MissingReference(&'static str),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Unique violations (23505) become `Conflict(resource)`, foreign key violations (23503)
    /// `MissingReference`, everything else stays `Db`.
    pub fn from_sqlx(e: sqlx::Error, resource: &'static str) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            match dbe.code().as_deref() {
                Some("23505") => return RepoError::Conflict(resource),
                Some("23503") => {
                    return RepoError::MissingReference(referenced_by(dbe.constraint()));
                }
                _ => {}
            }
        }
        RepoError::Db(e)
    }
}

// Postgres names foreign keys `<table>_<column>_fkey`.
fn referenced_by(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("course_students_student_id_fkey") => "student",
        Some("course_students_course_id_fkey") => "course",
        Some("courses_instructor_id_fkey") => "instructor",
        _ => "reference",
    }
}
