//! Expiry Cache - demo binary
//!
//! Seeds a cache with a permanent and an expiring entry, runs the background
//! reaper until Ctrl+C/SIGTERM, then prints final statistics as JSON.

use anyhow::Context;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiry_cache::{spawn_reaper, Cache, Config};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and seed it
/// 4. Start the background expiry reaper
/// 5. Wait for SIGINT/SIGTERM, stop the reaper, print stats
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiry_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting expiry cache demo");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: reaper_fallback={}s, demo_ttl={}s",
        config.reaper_fallback_secs, config.demo_ttl_secs
    );

    let cache: Cache<String, String> = Cache::new();
    cache.set("greeting".to_string(), "hello".to_string());
    cache.set_with_ttl(
        "session".to_string(),
        "token-123".to_string(),
        config.demo_ttl(),
    );
    info!(
        "Cache seeded: entries={}, next_expiry={:?}",
        cache.len(),
        cache.next_expiry_time()
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let reaper = spawn_reaper(
        cache.clone(),
        config.reaper_fallback(),
        async move {
            let _ = stop_rx.await;
        },
        |key, value| {
            info!("Evicted {} = {}", key, value);
            true
        },
    );
    info!("Background reaper started");

    shutdown_signal().await;

    let _ = stop_tx.send(());
    reaper.await.context("Reaper task panicked")?;

    let stats = cache.stats();
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("Failed to encode stats")?
    );

    info!(
        "Shutdown complete: entries={}, with_ttl={:.0}%, evicted={}",
        stats.total_entries,
        stats.ttl_ratio() * 100.0,
        stats.evicted
    );
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
