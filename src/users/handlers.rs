use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser, password},
    error::ApiError,
    state::AppState,
    users::{
        dto::{UpdateUserRequest, UserEnvelope, UserListResponse, UserResponse},
        repo::{is_unique_violation, Role, User, UserChanges},
    },
};

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = User::list(&state.db).await?;
    info!(count = users.len(), "retrieved users");
    Ok(Json(UserListResponse {
        message: "Successfully retrieved users".into(),
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(UserEnvelope {
        message: "Successfully retrieved user".into(),
        user: user.into(),
    }))
}

/// Users may update their own record; only admins may touch other users or
/// change roles.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    payload.validate().map_err(ApiError::Validation)?;

    if claims.role != Role::Admin && claims.sub != id {
        return Err(ApiError::Forbidden);
    }
    if payload.role.is_some() && claims.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }

    let password_hash = match payload.password {
        Some(plain) => Some(password::hash_blocking(plain).await?),
        None => None,
    };

    let changes = UserChanges {
        name: payload.name,
        email: payload.email,
        password_hash,
        role: payload.role,
    };

    match User::update(&state.db, id, changes).await {
        Ok(Some(user)) => {
            info!(user_id = %user.id, email = %user.email, "user updated successfully");
            Ok(Json(UserEnvelope {
                message: "User updated successfully".into(),
                user: user.into(),
            }))
        }
        Ok(None) => Err(ApiError::NotFound),
        Err(e) if is_unique_violation(&e) => Err(ApiError::DuplicateEmail),
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if claims.role != Role::Admin && claims.sub != id {
        return Err(ApiError::Forbidden);
    }

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }

    info!(user_id = %id, "user deleted successfully");
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}
