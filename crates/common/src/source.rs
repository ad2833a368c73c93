use async_trait::async_trait;

use crate::{Indicator, Result};

/// Abstraction over the external indicator service.
///
/// `FinnhubClient` implements this for live data.
/// `SimulatedSource` implements this for offline runs.
///
/// Implementations report failures as errors; substituting defaults is the
/// caller's job, so a source never invents values.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Fetch the chronological 1-minute series of `indicator` for `symbol`
    /// (e.g. "USDINR"). Oldest value first.
    async fn series(&self, symbol: &str, indicator: Indicator) -> Result<Vec<f64>>;
}
