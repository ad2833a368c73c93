use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, IndicatorSource, SourceMode};
use engine::{Engine, FinnhubClient, SignalSelector};
use ledger::{BadSignalStore, OutcomeTracker};
use sim::SimulatedSource;
use strategy::SignalFileConfig;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(source = %cfg.source_mode, interval = ?cfg.cycle_interval, "SignalBot starting");

    let signal_cfg = SignalFileConfig::load_or_default(&cfg.signal_config_path)
        .unwrap_or_else(|e| panic!("Failed to load signal config: {e}"));
    info!(pairs = ?signal_cfg.pairs, "Signal config loaded");

    // ── Indicator source (injected based on INDICATOR_SOURCE) ─────────────────
    let source: Arc<dyn IndicatorSource> = match cfg.source_mode {
        SourceMode::Live => {
            info!(base_url = %cfg.finnhub_base_url, "Live indicators, using FinnhubClient");
            let api_key = cfg.finnhub_api_key.clone().unwrap_or_default();
            Arc::new(
                FinnhubClient::new(api_key, &cfg.finnhub_base_url, cfg.fetch_timeout)
                    .unwrap_or_else(|e| panic!("Failed to build Finnhub client: {e}")),
            )
        }
        SourceMode::Simulated => {
            info!("Simulated indicators, using SimulatedSource");
            Arc::new(SimulatedSource::random())
        }
    };

    // ── Shared state ──────────────────────────────────────────────────────────
    let bad_signals = BadSignalStore::new();
    let ledger = Arc::new(OutcomeTracker::new(bad_signals.clone()));

    // ── Engine ────────────────────────────────────────────────────────────────
    let selector = SignalSelector::from_config(source, &signal_cfg, bad_signals);
    let (engine, handle) = Engine::new(selector, ledger, cfg.cycle_interval);

    // ── Cycle report logger ───────────────────────────────────────────────────
    let mut cycles = handle.subscribe_cycles();
    let stats_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            match cycles.recv().await {
                Ok(report) => {
                    let stats = stats_handle.stats().await;
                    match report.signal {
                        Some(s) => info!(
                            pair = %s.pair,
                            direction = %s.direction,
                            confidence = %s.confidence_display(),
                            rsi = %s.rsi_display(),
                            macd = %s.macd_display(),
                            ema = %s.ema_display(),
                            amount = %s.trade_amount,
                            candle_time = %s.candle_time,
                            win_rate = %stats.win_rate_display(),
                            "📈 New signal"
                        ),
                        None => info!(
                            holds = report.holds,
                            suppressed = report.suppressed,
                            "No signal available this cycle"
                        ),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(dropped = n, "Cycle report logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    });

    // ── Spawn ─────────────────────────────────────────────────────────────────
    tokio::spawn(engine.run());
    handle
        .start()
        .await
        .unwrap_or_else(|e| panic!("Failed to start engine: {e}"));

    // First signal right away, then on the timer.
    if let Err(e) = handle.generate_signal().await {
        warn!(error = %e, "Initial cycle failed");
    }

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();

    let stats = handle.stats().await;
    info!(
        total = stats.total,
        wins = stats.wins,
        win_rate = %stats.win_rate_display(),
        history = handle.history().await.len(),
        "Shutdown signal received. Exiting."
    );
}
