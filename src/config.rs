//! Environment configuration for the relay and the terminal client

use crate::llm::{ConfigError, LlmConfig};
use axum::http::HeaderValue;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

/// Relay service configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    /// The single browser origin allowed to call the relay
    pub allowed_origin: HeaderValue,
    pub llm: LlmConfig,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let port = match lookup("CHATBOT_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "CHATBOT_PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let origin = lookup("CHATBOT_ALLOWED_ORIGIN")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        let allowed_origin =
            HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|_| {
                ConfigError::Invalid {
                    name: "CHATBOT_ALLOWED_ORIGIN",
                    value: origin.clone(),
                }
            })?;

        Ok(Self {
            port,
            allowed_origin,
            llm: LlmConfig::from_lookup(&lookup)?,
        })
    }
}

/// Terminal client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            relay_url: std::env::var("CHATBOT_RELAY_URL")
                .unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string()),
        }
    }
}
