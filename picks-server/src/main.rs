use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::info;

use picks_persistence::MemoryStore;
use picks_persistence::repositories::{FixtureRepository, UserRepository};
use picks_server::{
    clock::SystemClock,
    config::Config,
    create_routes,
    deadline_service::{DeadlineOverrides, DeadlineService},
    pick_manager::PickManager,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting picks server...");

    let config = Config::new();

    // Local document store; production deployments plug a real backend
    // into the same DocumentStore trait.
    let store = Arc::new(MemoryStore::new());
    tracing::warn!("using the in-memory document store - data does not survive a restart");

    let op_timeout = Duration::from_secs(config.store_timeout_seconds);
    let users = Arc::new(UserRepository::with_timeout(store.clone(), op_timeout));
    let fixtures = Arc::new(FixtureRepository::with_timeout(store.clone(), op_timeout));

    let overrides = if config.use_legacy_deadline_overrides {
        info!("legacy deadline overrides enabled");
        DeadlineOverrides::legacy_defaults()
    } else {
        DeadlineOverrides::empty()
    };

    let deadlines = Arc::new(DeadlineService::with_cache_ttl(
        fixtures.clone(),
        overrides,
        Arc::new(SystemClock),
        Duration::from_secs(config.deadline_cache_ttl_seconds),
    ));

    let manager = Arc::new(PickManager::new(
        users.clone(),
        fixtures.clone(),
        deadlines.clone(),
    ));

    let routes = create_routes(manager, deadlines, fixtures);

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().expect("Invalid HOST"),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
