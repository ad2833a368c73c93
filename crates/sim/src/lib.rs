use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{Error, Indicator, IndicatorSnapshot, IndicatorSource, Pair, Result};

/// Scripted response for one (symbol, indicator).
#[derive(Debug, Clone)]
enum Script {
    Series(Vec<f64>),
    Fail(String),
}

/// Simulated indicator service for offline runs and tests.
///
/// Series can be scripted per pair and indicator. Unscripted requests either
/// fail or, in random mode, return a single random value. No network calls
/// are ever made.
pub struct SimulatedSource {
    /// Keyed by service symbol, e.g. "USDINR".
    scripts: Arc<RwLock<HashMap<(String, Indicator), Script>>>,
    random_fallback: bool,
    latency: Duration,
    calls: AtomicUsize,
}

impl SimulatedSource {
    /// Scripted-only source: unscripted requests fail.
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(RwLock::new(HashMap::new())),
            random_fallback: false,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Unscripted requests get random values: RSI in [0, 100), MACD in
    /// [-2, 2), EMA in [0.5, 1.5).
    pub fn random() -> Self {
        info!("SimulatedSource initialized with random indicators");
        Self {
            random_fallback: true,
            ..Self::new()
        }
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn set_series(&self, pair: &Pair, indicator: Indicator, series: Vec<f64>) {
        self.scripts
            .write()
            .await
            .insert((pair.symbol(), indicator), Script::Series(series));
    }

    /// Script all three indicators so their last values equal `snapshot`.
    pub async fn set_snapshot(&self, pair: &Pair, snapshot: IndicatorSnapshot) {
        self.set_series(pair, Indicator::Rsi, vec![snapshot.rsi]).await;
        self.set_series(pair, Indicator::Macd, vec![snapshot.macd]).await;
        self.set_series(pair, Indicator::Ema, vec![snapshot.ema]).await;
    }

    /// Make requests for `indicator` on `pair` fail with `reason`.
    pub async fn fail(&self, pair: &Pair, indicator: Indicator, reason: impl Into<String>) {
        self.scripts
            .write()
            .await
            .insert((pair.symbol(), indicator), Script::Fail(reason.into()));
    }

    /// Remove every script for `pair`.
    pub async fn clear(&self, pair: &Pair) {
        let symbol = pair.symbol();
        self.scripts.write().await.retain(|(s, _), _| *s != symbol);
    }

    /// Number of `series` requests served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn random_value(indicator: Indicator) -> f64 {
        let mut rng = rand::thread_rng();
        match indicator {
            Indicator::Rsi => rng.gen_range(0.0..100.0),
            Indicator::Macd => rng.gen_range(-2.0..2.0),
            Indicator::Ema => rng.gen_range(0.5..1.5),
        }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndicatorSource for SimulatedSource {
    async fn series(&self, symbol: &str, indicator: Indicator) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let script = self
            .scripts
            .read()
            .await
            .get(&(symbol.to_string(), indicator))
            .cloned();

        match script {
            Some(Script::Series(series)) => Ok(series),
            Some(Script::Fail(reason)) => Err(Error::Source(reason)),
            None if self.random_fallback => {
                let value = Self::random_value(indicator);
                debug!(symbol, %indicator, value, "Simulated indicator value");
                Ok(vec![value])
            }
            None => Err(Error::Source(format!(
                "no simulated {indicator} series for '{symbol}'"
            ))),
        }
    }
}
