//! HTTP API for the relay
//!
//! A single stateless endpoint, `POST /ask`, forwards a transcript and a
//! new message to the upstream model and returns the generated text.

mod handlers;
mod origin;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::llm::LlmService;
use axum::http::HeaderValue;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmService>,
    pub allowed_origin: HeaderValue,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmService>, allowed_origin: HeaderValue) -> Self {
        Self {
            llm,
            allowed_origin,
        }
    }
}
