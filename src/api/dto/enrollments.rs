use serde::{Deserialize, Serialize};

use crate::repos::EnrollmentRow;

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub student_id: i64,
    pub course_id: i64,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub course_id: i64,
    pub course_name: String,
}

impl From<EnrollmentRow> for EnrollmentResponse {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            student_name: row.student_name,
            course_id: row.course_id,
            course_name: row.course_name,
        }
    }
}
