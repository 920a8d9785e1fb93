//! HTTP API.
//!
//! | Method | Path                        | Purpose                                  |
//! |--------|-----------------------------|------------------------------------------|
//! | GET    | `/api/publications`         | cached data if fresh, else 307 to stream |
//! | POST   | `/api/publications/update`  | synchronous refresh                      |
//! | GET    | `/api/publications/status`  | cache presence and freshness             |
//! | GET    | `/api/publications/stream`  | refresh with SSE progress                |
//! | GET    | `/api/status`               | liveness                                 |

mod handlers;
mod router;
mod sse;
mod state;

pub use router::build_router;
pub use state::{AppState, SharedState};

use anyhow::Context;

use crate::config::Config;
use crate::service::PublicationService;

/// Run the HTTP server until Ctrl-C
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let service = PublicationService::from_config(config)?;
    let app = build_router(AppState::new(service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Serving publications of author {}", config.author.id);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
