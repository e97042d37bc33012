//! flood-proxy: same-origin shim for the Seoul open-data API.
//! Forwards `/api/*` to the upstream host with permissive CORS headers
//! so browser clients can query it directly. No routing logic, auth,
//! or body transformation.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, Clone)]
struct ProxyConfig {
    port: u16,
    upstream: String,
}

impl ProxyConfig {
    fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("port", 3001_i64)?
            .set_default("upstream", "http://openapi.seoul.go.kr:8088")?
            .add_source(config::Environment::with_prefix("FLOODPROXY"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Clone)]
struct ProxyState {
    http: reqwest::Client,
    upstream: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxy=debug,tower_http=debug".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let config = ProxyConfig::load().context("loading proxy configuration")?;

    let state = ProxyState {
        http: reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?,
        upstream: config.upstream.trim_end_matches('/').to_string(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/*path", get(forward))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("flood-proxy listening on {addr}, upstream {}", config.upstream);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

/// Forward the request path and query to the upstream, relaying status,
/// content type and body verbatim.
async fn forward(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let mut url = format!("{}/{}", state.upstream, path);
    if let Some(query) = query {
        url.push('?');
        url.push_str(&query);
    }

    let upstream = match state.http.get(&url).send().await {
        Ok(resp) => resp,
        Err(err) => {
            tracing::error!(%url, error = %err, "upstream request failed");
            return proxy_error(err.to_string());
        }
    };

    // reqwest and axum sit on different http crate versions, so status
    // and headers cross over as plain values
    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    match upstream.bytes().await {
        Ok(body) => ([(header::CONTENT_TYPE, content_type)], body)
            .into_response()
            .map_status(status),
        Err(err) => {
            tracing::error!(%url, error = %err, "reading upstream body failed");
            proxy_error(err.to_string())
        }
    }
}

fn proxy_error(message: String) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": "proxy error", "message": message })),
    )
        .into_response()
}

/// Small helper so the relayed status survives `into_response`.
trait MapStatus {
    fn map_status(self, status: StatusCode) -> Response;
}

impl MapStatus for Response {
    fn map_status(mut self, status: StatusCode) -> Response {
        *self.status_mut() = status;
        self
    }
}
