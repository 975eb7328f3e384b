use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::USER_AGENT, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use super::{
    gate::{Decision, DenyReason},
    RequestMeta,
};
use crate::state::AppState;

/// Admission middleware applied ahead of every route. Denials short-circuit
/// before any handler runs.
pub async fn protect(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let meta = request_meta(&req);
    match state.gate.decide(&meta) {
        Decision::Allow => next.run(req).await,
        Decision::Deny(reason) => {
            warn!(
                ip = %meta.ip,
                user_agent = meta.user_agent.as_deref().unwrap_or("-"),
                method = %meta.method,
                path = %meta.path,
                reason = ?reason,
                "request denied by security gate"
            );
            deny_response(reason)
        }
        Decision::Unavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "Service Unavailable",
                "message": "Security checks are unavailable. Try again later.",
            })),
        )
            .into_response(),
    }
}

fn deny_response(reason: DenyReason) -> Response {
    match reason {
        DenyReason::Bot => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Forbidden",
                "message": "Automated requests are not allowed",
                "reason": "bot_detection",
            })),
        ),
        DenyReason::Shield => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Forbidden",
                "message": "Request blocked by security policy",
                "reason": "shield_protection",
            })),
        ),
        DenyReason::RateLimit => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too Many Requests",
                "message": "Rate limit exceeded. Try again later.",
                "reason": "rate_limit",
            })),
        ),
    }
    .into_response()
}

/// Pull the gate's inputs off the request. The client IP prefers the first
/// `X-Forwarded-For` hop (proxy deployments), then the peer socket address.
fn request_meta(req: &Request) -> RequestMeta {
    let ip = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".into());

    RequestMeta {
        ip,
        user_agent: req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
    }
}
