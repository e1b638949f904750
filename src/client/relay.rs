//! Outbound calls from the client to the relay

use crate::api::{AskResponse, ErrorResponse};
use crate::transcript::Transcript;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay returned HTTP {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },
    #[error("malformed relay response: {0}")]
    MalformedPayload(String),
}

/// Client side of the relay contract
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Send the prior transcript and the new message; returns the reply text
    async fn ask(&self, history: &Transcript, message: &str) -> Result<String, ClientError>;
}

#[derive(Serialize)]
struct AskBody<'a> {
    history: &'a Transcript,
    message: &'a str,
}

/// Relay client over HTTP
pub struct HttpRelayClient {
    client: Client,
    url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/ask", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn ask(&self, history: &Transcript, message: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(&self.url)
            .json(&AskBody { history, message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .map(|e| e.error);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<AskResponse>(&body)
            .map(|r| r.data)
            .map_err(|e| ClientError::MalformedPayload(e.to_string()))
    }
}
