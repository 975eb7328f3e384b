use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::users::repo::{Role, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err("Invalid input - Name, email, and password are required".into());
        }
        if !is_valid_email(&self.email) {
            return Err("Invalid input - Invalid email format".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err("Invalid input - Email and password are required".into());
        }
        if !is_valid_email(&self.email) {
            return Err("Invalid input - Invalid email format".into());
        }
        Ok(())
    }
}

/// Hash-free projection returned by the session endpoints.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: 1,
            name: "A".into(),
            email: "a@b.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            role: Role::User,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn email_pattern_accepts_plain_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("user.name+tag@sub.domain.org"));
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("spaces in@local.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("@missing-local.com"));
    }

    #[test]
    fn sign_up_requires_all_fields() {
        let req = SignUpRequest {
            name: "".into(),
            email: "a@b.com".into(),
            password: "secret123".into(),
        };
        assert!(req.validate().is_err());
        let req = SignUpRequest {
            name: "A".into(),
            email: "a@b.com".into(),
            password: "secret123".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn sign_up_rejects_bad_email() {
        let req = SignUpRequest {
            name: "A".into(),
            email: "not-an-email".into(),
            password: "secret123".into(),
        };
        assert_eq!(
            req.validate().unwrap_err(),
            "Invalid input - Invalid email format"
        );
    }

    #[test]
    fn public_user_never_serializes_the_hash() {
        let json = serde_json::to_string(&PublicUser::from(sample_user())).unwrap();
        assert!(json.contains("a@b.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}
