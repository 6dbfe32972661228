//! `GameServer`: the TCP accept loop that ties the layers together.

use std::sync::Arc;

use gridsnake_game::GameConfig;
use gridsnake_room::RoomRegistry;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::ServerError;
use crate::handler::handle_connection;

/// A gridsnake server bound to a socket address.
///
/// Call [`run`](Self::run) to start accepting connections. Each
/// connection gets its own handler task; rooms live in their own actor
/// tasks behind the shared registry.
pub struct GameServer {
    listener: TcpListener,
    config: GameConfig,
    registry: Arc<Mutex<RoomRegistry>>,
}

impl GameServer {
    /// Binds to the given address with the given game constants.
    pub async fn bind(addr: &str, config: GameConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr, "listening");
        let registry = Arc::new(Mutex::new(RoomRegistry::new(config.clone())));
        Ok(Self {
            listener,
            config,
            registry,
        })
    }

    /// The address the server actually bound to. Useful with port 0.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    tracing::debug!(%addr, "incoming connection");
                    let config = self.config.clone();
                    let registry = Arc::clone(&self.registry);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, config, registry).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
