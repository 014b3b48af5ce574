pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use error::{RepoError, RepoResult};
pub use memory::InMemoryStore;
pub use models::{CourseRow, EnrollmentRow, NewUser, UserRow};
pub use postgres::PgStore;
pub use store::SchoolStore;
