use std::sync::Arc;

use subfetch::server::{create_router, AppState};
use subfetch::upstream::YoutubeTransport;
use subfetch::{Config, ResponseCache, TranscriptService};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Launching transcript service...");

    let config = Config::from_env();
    log::info!(
        "Cache TTL {:?}, {} attempts per upstream call, retry delay {:?}",
        config.cache_ttl,
        config.retry.max_attempts,
        config.retry.delay
    );

    let transport = match YoutubeTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            log::error!("Failed to build the upstream client: {}", e);
            std::process::exit(1);
        }
    };
    let service = TranscriptService::new(
        Arc::new(transport),
        Arc::new(ResponseCache::new(config.cache_ttl)),
        config.retry,
    );
    let app = create_router(AppState {
        service,
        default_language: config.default_language.clone(),
    });

    let address = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {}: {}", address, e);
            std::process::exit(1);
        }
    };
    log::info!("Listening on {}", address);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        log::error!("Server error: {}", e);
    }
    log::info!("Server shutdown complete");
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Received shutdown signal"),
        Err(e) => {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
