//! Cross-origin policy for the relay
//!
//! Browsers get CORS headers for exactly one origin. Requests that carry
//! a different `Origin` are refused outright instead of relying on the
//! browser to drop the response.

use super::{AppState, ErrorResponse};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::cors::CorsLayer;

pub fn cors_layer(allowed_origin: &HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin.clone())
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Reject requests from foreign origins before they reach a handler.
/// Requests without an `Origin` header are not cross-origin and pass.
pub async fn require_allowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match request.headers().get(header::ORIGIN) {
        Some(origin) if *origin != state.allowed_origin => {
            tracing::warn!(origin = ?origin, "Rejected request from disallowed origin");
            (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("Origin not allowed")),
            )
                .into_response()
        }
        _ => next.run(request).await,
    }
}
