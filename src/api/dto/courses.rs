use serde::{Deserialize, Serialize};

use crate::repos::CourseRow;

#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    pub name: String,
    pub instructor_id: Option<i64>,
}

impl CourseRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > 128 {
            return Err("name must be <= 128 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: i64,
    pub name: String,
    pub instructor_id: Option<i64>,
}

impl From<CourseRow> for CourseResponse {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            instructor_id: row.instructor_id,
        }
    }
}
