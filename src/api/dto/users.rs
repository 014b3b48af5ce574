/*
 * Responsibility
 * - Request/response DTOs for /api/user and the user listings
 * - The password hash never leaves the server
 */
use serde::{Deserialize, Serialize};

use crate::repos::UserRow;
use crate::services::auth::IssuedToken;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.username.len() > 64 {
            return Err("username must be <= 64 chars");
        }
        if self.username.contains(':') {
            // would break Basic credentials at login
            return Err("username must not contain ':'");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: String,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            username: row.username,
            role: row.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: String,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl LoginResponse {
    pub fn new(user: UserRow, issued: IssuedToken) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
            expires_in: issued.expires_at - issued.issued_at,
            token: issued.token,
            token_type: "Bearer",
        }
    }
}
