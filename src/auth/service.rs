use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::password,
    error::ApiError,
    users::repo::{is_unique_violation, NewUser, Role, User},
};

/// Domain outcomes of the auth operations. `UserNotFound` and
/// `InvalidPassword` stay distinguishable here (and in logs) and are only
/// collapsed at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user with this email already exists")]
    DuplicateEmail,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => ApiError::DuplicateEmail,
            // Collapsed so the response never reveals which one happened.
            AuthError::UserNotFound | AuthError::InvalidPassword => ApiError::InvalidCredentials,
            AuthError::Internal(e) => ApiError::Internal(e),
        }
    }
}

/// Create a user with a freshly hashed password. The lookup is an early
/// exit; the storage-layer UNIQUE constraint is what actually guarantees
/// one user per email under concurrent signups.
pub async fn create_user(
    db: &PgPool,
    name: String,
    email: String,
    password: String,
    role: Role,
) -> Result<User, AuthError> {
    if User::find_by_email(db, &email).await?.is_some() {
        return Err(AuthError::DuplicateEmail);
    }

    let password_hash = password::hash_blocking(password).await?;

    match User::create(
        db,
        &NewUser {
            name,
            email,
            password_hash,
            role,
        },
    )
    .await
    {
        Ok(user) => {
            info!(email = %user.email, "new user created");
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => Err(AuthError::DuplicateEmail),
        Err(e) => Err(AuthError::Internal(e)),
    }
}

/// Check a credential pair against the store.
pub async fn authenticate(db: &PgPool, email: &str, plain: &str) -> Result<User, AuthError> {
    let user = match User::find_by_email(db, email).await? {
        Some(user) => user,
        None => {
            warn!(email = %email, "authentication for unknown email");
            return Err(AuthError::UserNotFound);
        }
    };

    let ok = password::verify_blocking(plain.to_string(), user.password_hash.clone()).await?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "authentication with invalid password");
        return Err(AuthError::InvalidPassword);
    }

    info!(email = %user.email, "user authenticated");
    Ok(user)
}
