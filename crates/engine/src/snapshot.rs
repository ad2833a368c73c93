use std::sync::Arc;

use tracing::warn;

use common::{Indicator, IndicatorSnapshot, IndicatorSource, Pair, Result};

/// Fetches the RSI/MACD/EMA snapshot of a pair, never failing.
///
/// The three series are requested concurrently. Any indicator that fails,
/// comes back empty, or ends in a non-finite value falls back to its default.
#[derive(Clone)]
pub struct IndicatorClient {
    source: Arc<dyn IndicatorSource>,
}

impl IndicatorClient {
    pub fn new(source: Arc<dyn IndicatorSource>) -> Self {
        Self { source }
    }

    pub async fn snapshot(&self, pair: &Pair) -> IndicatorSnapshot {
        let symbol = pair.symbol();
        let (rsi, macd, ema) = tokio::join!(
            self.source.series(&symbol, Indicator::Rsi),
            self.source.series(&symbol, Indicator::Macd),
            self.source.series(&symbol, Indicator::Ema),
        );

        IndicatorSnapshot {
            rsi: last_or_default(pair, Indicator::Rsi, rsi),
            macd: last_or_default(pair, Indicator::Macd, macd),
            ema: last_or_default(pair, Indicator::Ema, ema),
        }
    }
}

fn last_or_default(pair: &Pair, indicator: Indicator, fetched: Result<Vec<f64>>) -> f64 {
    let default = indicator.default_value();
    match fetched {
        Ok(series) => match series.last().copied() {
            Some(value) if value.is_finite() => value,
            Some(value) => {
                warn!(pair = %pair, %indicator, value, default, "Non-finite indicator value, using default");
                default
            }
            None => {
                warn!(pair = %pair, %indicator, default, "Empty indicator series, using default");
                default
            }
        },
        Err(e) => {
            warn!(pair = %pair, %indicator, error = %e, default, "Indicator fetch failed, using default");
            default
        }
    }
}
