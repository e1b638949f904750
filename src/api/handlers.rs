//! HTTP request handlers

use super::origin::{cors_layer, require_allowed_origin};
use super::types::{
    AskRequest, AskResponse, ErrorResponse, ValidationError, INVALID_BODY, UPSTREAM_FAILURE,
};
use super::AppState;
use crate::llm::ChatRequest;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origin);

    Router::new()
        .route("/ask", post(ask))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_allowed_origin,
        ))
        .route("/version", get(get_version))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================
// Relay
// ============================================================

async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected unparseable request body");
        AppError::BadRequest(INVALID_BODY.to_string())
    })?;

    let AskRequest { history, message } = AskRequest::from_value(body)?;

    tracing::debug!(
        history_turns = history.len(),
        message_chars = message.chars().count(),
        "Relaying message upstream"
    );

    let request = ChatRequest::new(history, message);
    let reply = state.llm.complete(&request).await.map_err(|e| {
        tracing::error!(error = %e, kind = %e.kind, "Error generating response");
        AppError::Upstream
    })?;

    Ok(Json(AskResponse { data: reply.text }))
}

async fn get_version() -> &'static str {
    concat!("llm-chatbot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    /// Upstream failed; the cause is logged, never returned
    Upstream,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UPSTREAM_FAILURE.to_string(),
            ),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
