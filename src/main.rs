//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the console.
//! No business logic here.

use dotenv::dotenv;
use reactor_bot::adapters::history::JsonExportHistory;
use reactor_bot::adapters::ui::ConsoleInputPort;
use reactor_bot::ports::{HistoryPort, InputPort};
use reactor_bot::shared::config::AppConfig;
use reactor_bot::usecases::{Reactor, ReactorOptions, ReplyService, TrainingService};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    let loaded = AppConfig::load();
    let cfg = loaded.as_ref().ok().cloned().unwrap_or_default();

    let default_level = if cfg.debug_enabled() { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = &loaded {
        warn!(error = %e, "invalid configuration; falling back to defaults");
    }
    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => debug!("no .env found"),
    }
    info!("get ready for reactions!");

    // --- Reactor: model + bounded training queue (learn blocks when full) ---
    let reactor = Arc::new(
        Reactor::new(ReactorOptions {
            queue_capacity: cfg.queue_capacity_or_default(),
            workers: cfg.workers_or_default(),
        })
        .map_err(|e| anyhow::anyhow!("{}", e))?,
    );

    // --- History source ---
    let history_dir = cfg.history_dir_or_default();
    info!(path = %history_dir, "reading channel history exports");
    let history: Arc<dyn HistoryPort> = Arc::new(JsonExportHistory::new(&history_dir));

    // --- Services ---
    let training = Arc::new(TrainingService::new(
        history,
        Arc::clone(&reactor),
        cfg.max_messages_or_default(),
        cfg.page_size_or_default(),
    ));
    let replies = Arc::new(ReplyService::new(Arc::clone(&reactor), Arc::clone(&training)));

    // --- Initial training in the background; replies say "still learning" meanwhile ---
    let initial = Arc::clone(&training);
    tokio::spawn(async move {
        if let Err(e) = initial.refresh().await {
            error!(error = %e, "initial training failed");
        }
    });

    // --- Run (console until quit) ---
    let input_port: Arc<dyn InputPort> = Arc::new(ConsoleInputPort::new(replies));
    let outcome = input_port.run().await;

    reactor.shutdown().await;
    outcome.map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(())
}
