//! Server binary: parse the port, set up logging, run the accept loop.

use gridsnake_game::GameConfig;
use gridsnake_server::{GameServer, ServerError};
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8787;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Port from the first argument, then $PORT, then the default.
    let port = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let server = GameServer::bind(&format!("0.0.0.0:{port}"), GameConfig::default()).await?;
    tracing::info!(port, "gridsnake server ready");
    server.run().await
}
