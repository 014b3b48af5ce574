pub mod enrollments;
pub mod health;
pub mod managers;
pub mod students;
pub mod teachers;
pub mod users;
