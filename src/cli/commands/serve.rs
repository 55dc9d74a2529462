use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::config::initialize_app_state_with_url;
use crate::router::create_router;

/// Run the HTTP API until Ctrl-C is received.
#[instrument]
pub async fn serve(database_url: &str, bind_address: &str) -> Result<()> {
    let state = initialize_app_state_with_url(database_url)
        .await
        .context("failed to initialize application state")?;
    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Userbase API listening on http://{}", bind_address);
    info!("Swagger UI at http://{}/swagger-ui", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal handler the server runs until killed
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
