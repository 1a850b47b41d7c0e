use std::net::SocketAddr;

use template_backend::{config, logging, web};

const DEFAULT_WEB_PORT: u16 = 5173;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load()?;
    logging::init(&config);

    let port = match std::env::var("WEB_PORT") {
        Ok(raw) => raw.parse::<u16>().map_err(|e| anyhow::anyhow!("WEB_PORT is invalid: {e}"))?,
        Err(_) => DEFAULT_WEB_PORT,
    };
    let api_url = std::env::var("API_URL").unwrap_or_else(|_| format!("http://localhost:{}", config.port));

    let router = web::router(web::WebState::new(&config, api_url.clone()));

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(api_url = %api_url, "Web client started on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await
            }
        })
        .await?;

    Ok(())
}
