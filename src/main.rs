// =============================================================================
// Indicator Engine — Main Entry Point
// =============================================================================
//
// Loads bars from a CSV file into the window, prints the indicator report as
// JSON and, when `refresh_secs` is set, keeps polling the file for new rows
// until Ctrl+C.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use indicator_engine::market_data::CsvFeed;
use indicator_engine::{Engine, EngineConfig};

const DEFAULT_CONFIG_PATH: &str = "engine_config.json";

fn print_report(engine: &Engine) -> anyhow::Result<()> {
    let report = engine.compute_report();
    info!(
        version = engine.version(),
        bars = report.bar_count,
        last_date = ?report.last_date,
        signals = ?report.signal_summary(),
        "report ready"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::var("INDICATOR_ENGINE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = EngineConfig::load_or_default(&config_path);

    // Override the bar source from env if available.
    if let Ok(path) = std::env::var("INDICATOR_ENGINE_BARS") {
        let path = path.trim();
        if !path.is_empty() {
            config.bars_path = Some(PathBuf::from(path));
        }
    }

    info!(
        window_capacity = config.window_capacity,
        bars_path = ?config.bars_path,
        refresh_secs = config.refresh_secs,
        "Indicator engine starting"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let refresh_secs = config.refresh_secs;
    let bars_path = config.bars_path.clone();
    let engine = Arc::new(Engine::new(config));

    // ── 3. Initial load ──────────────────────────────────────────────────
    let mut feed = bars_path.map(CsvFeed::new);
    match feed.as_mut() {
        Some(feed) => {
            let added = engine.poll_feed(feed)?;
            info!(path = %feed.path().display(), added, "Initial bars loaded");
        }
        None => warn!("No bar source configured; set INDICATOR_ENGINE_BARS or bars_path"),
    }

    print_report(&engine)?;

    let Some(mut feed) = feed.filter(|_| refresh_secs > 0) else {
        return Ok(());
    };

    // ── 4. Refresh loop ──────────────────────────────────────────────────
    let refresh_engine = engine.clone();
    let refresher = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(refresh_secs));
        // The first tick fires immediately and the initial report is printed.
        interval.tick().await;
        loop {
            interval.tick().await;
            match refresh_engine.poll_feed(&mut feed) {
                Ok(0) => {}
                Ok(_) => {
                    if let Err(e) = print_report(&refresh_engine) {
                        error!(error = %e, "Failed to print report");
                    }
                }
                Err(e) => warn!(error = %e, "Bar feed poll failed — retrying next tick"),
            }
        }
    });

    info!(refresh_secs, "Watching for new bars. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping");
    refresher.abort();

    info!(version = engine.version(), "Indicator engine shut down complete.");
    Ok(())
}
