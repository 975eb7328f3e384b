use std::net::SocketAddr;

use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, config::AppConfig, security, state::AppState, users};

pub fn build_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api", get(api_index))
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .with_state(state.clone())
        .layer(CorsLayer::permissive());

    // The gate wraps everything added above, so denials short-circuit
    // before any handler runs.
    if state.config.security.enabled {
        app = app.layer(middleware::from_fn_with_state(
            state,
            security::middleware::protect,
        ));
    }

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::info_span!("http_request", %method, uri = %uri)
            })
            .on_response(
                |res: &axum::http::Response<_>,
                 _latency: std::time::Duration,
                 span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, "response");
                    } else {
                        tracing::info!(%status, "response");
                    }
                },
            ),
    )
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Acquisitions API Server is running!" }))
}

async fn api_index() -> Json<Value> {
    Json(json!({ "message": "API is working" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    }))
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
