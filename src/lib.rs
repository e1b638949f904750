//! LLM chatbot
//!
//! A stateless HTTP relay in front of a generative chat model, and a
//! conversation client that keeps the transcript and renders replies.

// Library surface: accessors and constructors are plain getters
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod client;
pub mod config;
pub mod llm;
pub mod render;
pub mod state_machine;
pub mod transcript;
