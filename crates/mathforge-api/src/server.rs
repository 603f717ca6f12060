use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, Uri};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use mathforge_core::{OperationKind, OperationResult, QuizQuestion};

use crate::dispatch::{endpoint_catalog, Dispatcher};
use crate::protocol::{ApiError, Cleared, HistoryPage, HistoryQuery, QuizQuery};

type ApiResult<T> = Result<Json<T>, ApiError>;
type JsonBody = Result<Json<Value>, JsonRejection>;

#[derive(Clone)]
pub struct AppState {
    dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/arithmetic", post(arithmetic))
        .route("/api/algebra/linear", post(linear))
        .route("/api/algebra/quadratic", post(quadratic))
        .route("/api/geometry/{shape}", post(geometry))
        .route("/api/statistics", post(statistics))
        .route("/api/quiz", get(quiz))
        .route("/api/quiz/validate", post(quiz_validate))
        .route("/api/history", get(history))
        .route("/api/history/clear", delete(clear_history))
        .fallback(fallback)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("MathForge listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn root() -> Json<Value> {
    Json(endpoint_catalog())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

async fn arithmetic(State(state): State<AppState>, body: JsonBody) -> ApiResult<OperationResult> {
    let Json(body) = body?;
    Ok(Json(state.dispatcher.arithmetic(body)?))
}

fn run(state: &AppState, kind: OperationKind, body: JsonBody) -> ApiResult<OperationResult> {
    let Json(body) = body?;
    Ok(Json(state.dispatcher.run(kind, body)?))
}

async fn linear(State(state): State<AppState>, body: JsonBody) -> ApiResult<OperationResult> {
    run(&state, OperationKind::Linear, body)
}

async fn quadratic(State(state): State<AppState>, body: JsonBody) -> ApiResult<OperationResult> {
    run(&state, OperationKind::Quadratic, body)
}

async fn geometry(
    State(state): State<AppState>,
    Path(shape): Path<String>,
    body: JsonBody,
) -> ApiResult<OperationResult> {
    let kind = shape
        .parse::<OperationKind>()
        .ok()
        .filter(OperationKind::is_shape)
        .ok_or_else(|| ApiError::UnknownRoute(format!("/api/geometry/{shape}")))?;
    run(&state, kind, body)
}

async fn statistics(State(state): State<AppState>, body: JsonBody) -> ApiResult<OperationResult> {
    run(&state, OperationKind::Statistics, body)
}

async fn quiz(
    State(state): State<AppState>,
    query: Result<Query<QuizQuery>, QueryRejection>,
) -> ApiResult<QuizQuestion> {
    let Query(query) = query?;
    let question = state
        .dispatcher
        .generate_quiz(query.category.as_deref(), query.difficulty.as_deref())?;
    Ok(Json(question))
}

async fn quiz_validate(State(state): State<AppState>, body: JsonBody) -> ApiResult<OperationResult> {
    run(&state, OperationKind::QuizValidate, body)
}

async fn history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<HistoryPage> {
    let Query(query) = query?;
    let history = state.dispatcher.list_history(query.limit)?;
    let store = state.dispatcher.history();
    Ok(Json(HistoryPage {
        total_queries: store.count()?,
        capacity: store.capacity(),
        history,
        timestamp: Utc::now(),
    }))
}

async fn clear_history(State(state): State<AppState>) -> ApiResult<Cleared> {
    let cleared = state.dispatcher.clear_history()?;
    Ok(Json(Cleared {
        message: format!("Cleared {cleared} queries from history"),
        cleared,
        timestamp: Utc::now(),
    }))
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::UnknownRoute(uri.path().to_string())
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
