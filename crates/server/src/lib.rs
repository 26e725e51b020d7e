//! The portal's JSON API and chat proxy.

mod error;
mod extract;
mod handlers;
mod logging;
mod router;
mod state;

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use fra_portal::GeminiConfig;
use log::{info, warn};
use tokio::net::TcpListener;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, Portal, SharedState};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub gemini: GeminiConfig,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Binds and serves until the process is stopped.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if config.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; the chat proxy will answer with 500");
    }

    let state = AppState::new(config.gemini.clone()).context("Building Gemini client")?;
    let app = build_router(state);

    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Binding {}", addr))?;
    info!("FRA portal API listening on http://{}", addr);
    axum::serve(listener, app).await.context("Serving HTTP")?;
    Ok(())
}
