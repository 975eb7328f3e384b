use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        cookies,
        dto::{MessageResponse, PublicUser, SessionResponse, SignInRequest, SignUpRequest},
        jwt::JwtKeys,
        service,
    },
    error::ApiError,
    state::AppState,
    users::repo::Role,
};

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<SessionResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    payload.validate().map_err(ApiError::Validation)?;

    let user = service::create_user(
        &state.db,
        payload.name,
        payload.email,
        payload.password,
        Role::User,
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;
    let headers = cookies::set_session_cookie(&token, keys.ttl(), state.config.secure_cookies())?;

    info!(email = %user.email, "user signed up successfully");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(SessionResponse {
            message: "User signed up successfully".into(),
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<SessionResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    payload.validate().map_err(ApiError::Validation)?;

    let user = service::authenticate(&state.db, &payload.email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;
    let headers = cookies::set_session_cookie(&token, keys.ttl(), state.config.secure_cookies())?;

    info!(email = %user.email, "user signed in successfully");
    Ok((
        StatusCode::OK,
        headers,
        Json(SessionResponse {
            message: "User signed in successfully".into(),
            user: PublicUser::from(user),
        }),
    ))
}

/// Clearing the cookie is all sign-out does; tokens themselves stay valid
/// until expiry. Idempotent with or without a prior session.
#[instrument(skip(state))]
pub async fn sign_out(
    State(state): State<AppState>,
) -> (StatusCode, HeaderMap, Json<MessageResponse>) {
    let headers = cookies::clear_session_cookie(state.config.secure_cookies());
    info!("user signed out");
    (
        StatusCode::OK,
        headers,
        Json(MessageResponse {
            message: "User signed out successfully".into(),
        }),
    )
}
