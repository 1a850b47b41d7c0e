use std::net::SocketAddr;

use template_backend::{app, config, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Validated once; everything downstream receives it through AppState
    let config = config::load()?;
    logging::init(&config);

    tracing::info!(
        service = logging::SERVICE_NAME,
        environment = config.environment.as_str(),
        port = config.port,
        "Starting server"
    );

    let port = config.port;
    let state = app::AppState::from_config(config).await?;
    let router = app::app(state);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!("Server started on http://{}", bind_addr);
    tracing::info!("Health check available at: http://localhost:{}/health", port);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
