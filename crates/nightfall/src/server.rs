//! `NightfallServer` builder and accept loop.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::ServerError;
use crate::gateway::handle_connection;
use nightfall_room::RoomRegistry;

/// Builder for configuring and starting a Nightfall server.
pub struct NightfallServerBuilder {
    bind_addr: String,
    room_channel_size: usize,
}

impl NightfallServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            room_channel_size: 64,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the command channel size for room actors.
    pub fn room_channel_size(mut self, size: usize) -> Self {
        self.room_channel_size = size;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<NightfallServer, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "listening");
        Ok(NightfallServer {
            listener,
            registry: Arc::new(RoomRegistry::with_channel_size(
                self.room_channel_size,
            )),
        })
    }
}

impl Default for NightfallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Nightfall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct NightfallServer {
    listener: TcpListener,
    registry: Arc<RoomRegistry>,
}

impl NightfallServer {
    pub fn builder() -> NightfallServerBuilder {
        NightfallServerBuilder::new()
    }

    /// The address the listener is bound to. Useful with port 0.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle to the room registry, for diagnostics and tests.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(&self.registry)
    }

    /// Runs the accept loop: one gateway task per connection, until the
    /// process is terminated. A failing connection only ends its own
    /// task.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&self.registry);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, addr, registry).await
                        {
                            tracing::debug!(
                                %addr,
                                error = %e,
                                "connection ended with error"
                            );
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
