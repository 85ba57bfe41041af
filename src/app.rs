use crate::error::TransportError;
use crate::models::RequestFilter;
use crate::overseerr::{OverseerrApi, OverseerrClient};
use crate::requests;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};

const PORT: u16 = 3262;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn OverseerrApi>,
}

pub async fn run_server() -> Result<()> {
    let api: Arc<dyn OverseerrApi> = Arc::new(OverseerrClient::from_env()?);
    let state = AppState { api };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], PORT));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(server_status))
        .route("/requests/movies", get(movie_requests))
        .route("/requests/tv", get(tv_requests))
        .route("/requests/tv/unavailable", get(unavailable_tv_requests))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn server_status(State(state): State<AppState>) -> String {
    requests::status_report(state.api.as_ref()).await
}

#[derive(Debug, Deserialize)]
struct RequestQuery {
    status: Option<String>,
    start_date: Option<String>,
}

impl RequestQuery {
    /// Resolves the raw query into a typed filter, rejecting tokens outside
    /// the seven the backend accepts. An unparseable start date is only
    /// warned about: the comparison downstream is lexicographic and still
    /// applies whatever string the caller sent.
    fn parse(self) -> Result<(Option<RequestFilter>, Option<String>), String> {
        let filter = match self.status.as_deref() {
            Some(raw) => Some(raw.parse::<RequestFilter>()?),
            None => None,
        };
        if let Some(date) = self.start_date.as_deref() {
            if chrono::DateTime::parse_from_rfc3339(date).is_err() {
                warn!(
                    "start_date '{}' is not RFC 3339; date filtering may misbehave",
                    date
                );
            }
        }
        Ok((filter, self.start_date))
    }
}

async fn movie_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Response {
    let (filter, start_date) = match query.parse() {
        Ok(parsed) => parsed,
        Err(message) => return bad_request(message),
    };
    match requests::list_movie_requests(state.api.as_ref(), filter, start_date.as_deref()).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => bad_gateway(e),
    }
}

async fn tv_requests(State(state): State<AppState>, Query(query): Query<RequestQuery>) -> Response {
    let (filter, start_date) = match query.parse() {
        Ok(parsed) => parsed,
        Err(message) => return bad_request(message),
    };
    match requests::list_tv_requests(state.api.as_ref(), filter, start_date.as_deref()).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => bad_gateway(e),
    }
}

async fn unavailable_tv_requests(State(state): State<AppState>) -> Response {
    match requests::list_unavailable_tv_requests(state.api.as_ref()).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => bad_gateway(e),
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn bad_gateway(e: TransportError) -> Response {
    warn!("aggregation aborted: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": e.to_string() })),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
