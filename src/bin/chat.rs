//! Terminal chat client
//!
//! Reads one message per line from stdin, sends it to the relay along with
//! the conversation so far, and prints the reply.

use llm_chatbot::client::{ChatClient, HttpRelayClient, TerminalView};
use llm_chatbot::config::ClientConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "llm_chatbot=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(relay = %config.relay_url, "Starting chat client");

    let relay = HttpRelayClient::new(&config.relay_url);
    let mut client = ChatClient::new(TerminalView::new(std::io::stdout()));

    eprintln!("Ask me anything... (Ctrl-D to quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        client.set_draft(line);
        client.send_draft(&relay).await;
    }

    Ok(())
}
