use anyhow::{Context, Result};
use std::time::Duration;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::info;

use super::book_routes::book_routes;
use super::metrics::metrics_handler;
use super::session::Session;
use super::state::ServerState;
use super::upload_routes::upload_routes;
use super::log_requests;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        user: session.map(|s| s.email),
    };
    Json(stats)
}

pub fn make_app(state: ServerState) -> Router {
    let api_routes: Router<ServerState> = Router::new()
        .merge(upload_routes(state.config.max_upload_bytes))
        .nest("/books", book_routes());

    let home_router: Router<ServerState> = match &state.config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)),
    };

    home_router
        .nest("/v1", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;
    let app = make_app(state);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}
