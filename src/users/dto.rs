use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::dto::is_valid_email;
use crate::users::repo::{Role, User};

/// Full outward projection of a stored user; the hash never appears.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub message: String,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
        {
            return Err("Invalid input - No fields to update".into());
        }
        if matches!(&self.name, Some(n) if n.is_empty()) {
            return Err("Invalid input - Name cannot be empty".into());
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err("Invalid input - Invalid email format".into());
            }
        }
        if matches!(&self.password, Some(p) if p.is_empty()) {
            return Err("Invalid input - Password cannot be empty".into());
        }
        Ok(())
    }
}
