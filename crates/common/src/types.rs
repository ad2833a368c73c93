use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pairs evaluated when the signal config does not list its own.
pub const DEFAULT_PAIRS: [&str; 9] = [
    "USD/INR", "USD/BDT", "USD/MXN", "USD/PKR", "USD/BRL", "EUR/USD", "USD/ARS", "NZD/CAD",
    "USD/NGN",
];

/// Informational stake attached to every signal.
pub const DEFAULT_TRADE_AMOUNT: &str = "$1";

/// A currency pair identifier as configured, e.g. `USD/INR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pair(String);

impl Pair {
    pub fn new(pair: impl Into<String>) -> Self {
        Self(pair.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symbol sent to the indicator service: separator removed, upper-cased.
    pub fn symbol(&self) -> String {
        self.0.replace('/', "").to_uppercase()
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pair {
    fn from(s: &str) -> Self {
        Pair::new(s)
    }
}

/// Indicators requested from the external service, all at 1-minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Rsi,
    Macd,
    Ema,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Rsi, Indicator::Macd, Indicator::Ema];

    /// Name used both as the query value and as the series key in the response.
    pub fn key(&self) -> &'static str {
        match self {
            Indicator::Rsi => "rsi",
            Indicator::Macd => "macd",
            Indicator::Ema => "ema",
        }
    }

    /// `None` means the service's default parameters.
    pub fn time_period(&self) -> Option<u32> {
        match self {
            Indicator::Rsi => Some(14),
            Indicator::Macd => None,
            Indicator::Ema => Some(5),
        }
    }

    /// Value substituted when the series is empty or could not be fetched.
    pub fn default_value(&self) -> f64 {
        match self {
            Indicator::Rsi => 50.0,
            Indicator::Macd | Indicator::Ema => 0.0,
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Last value of each indicator series for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub ema: f64,
}

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        Self {
            rsi: Indicator::Rsi.default_value(),
            macd: Indicator::Macd.default_value(),
            ema: Indicator::Ema.default_value(),
        }
    }
}

/// Direction of a materialized signal. HOLD is never a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Next whole clock minute as `H:MM`. Keys outcome reports to signals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandleTime(String);

impl CandleTime {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CandleTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A BUY/SELL recommendation produced by one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub pair: Pair,
    pub direction: Direction,
    /// Heuristic score in `[95.00, 100.00]`, rounded to two decimals.
    /// Randomized, not derived from the indicators.
    pub confidence: f64,
    pub trade_amount: String,
    pub candle_time: CandleTime,
    /// Raw indicator values. Similarity checks compare these, not the display strings.
    pub snapshot: IndicatorSnapshot,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    pub fn confidence_display(&self) -> String {
        format!("{:.2}", self.confidence)
    }

    pub fn rsi_display(&self) -> String {
        format!("{:.2}", self.snapshot.rsi)
    }

    pub fn macd_display(&self) -> String {
        format!("{:.2}", self.snapshot.macd)
    }

    pub fn ema_display(&self) -> String {
        format!("{:.2}", self.snapshot.ema)
    }
}

/// User-reported result of acting on a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Loss => write!(f, "LOSS"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WIN" => Ok(Outcome::Win),
            "LOSS" => Ok(Outcome::Loss),
            other => Err(crate::Error::Other(format!("unknown outcome '{other}'"))),
        }
    }
}

/// Where indicator data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Live,
    Simulated,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Live => write!(f, "live"),
            SourceMode::Simulated => write!(f, "simulated"),
        }
    }
}

/// Current state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Stopped => write!(f, "stopped"),
            EngineState::Running => write!(f, "running"),
            EngineState::Paused => write!(f, "paused"),
        }
    }
}

/// Commands sent to the engine via the command channel.
#[derive(Debug)]
pub enum EngineCommand {
    Start,
    Stop,
    Pause,
    Resume,
    /// Run one cycle now and reply with the resulting current signal.
    GenerateNow(tokio::sync::oneshot::Sender<Option<Signal>>),
}

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleTrigger {
    Timer,
    Manual,
}

/// Summary of one fetch → evaluate → filter → select pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub trigger: CycleTrigger,
    pub signal: Option<Signal>,
    /// Number of pairs evaluated.
    pub evaluated: usize,
    /// Pairs whose indicators resolved to HOLD.
    pub holds: usize,
    /// Candidates dropped for resembling a past loss.
    pub suppressed: usize,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_symbol_strips_separator_and_uppercases() {
        assert_eq!(Pair::new("usd/inr").symbol(), "USDINR");
        assert_eq!(Pair::new("NZD/CAD").symbol(), "NZDCAD");
    }

    #[test]
    fn snapshot_defaults_match_indicator_defaults() {
        let snap = IndicatorSnapshot::default();
        assert_eq!(snap.rsi, 50.0);
        assert_eq!(snap.macd, 0.0);
        assert_eq!(snap.ema, 0.0);
    }

    #[test]
    fn indicator_periods() {
        assert_eq!(Indicator::Rsi.time_period(), Some(14));
        assert_eq!(Indicator::Macd.time_period(), None);
        assert_eq!(Indicator::Ema.time_period(), Some(5));
    }

    #[test]
    fn outcome_parses_case_insensitively() {
        assert_eq!("win".parse::<Outcome>().unwrap(), Outcome::Win);
        assert_eq!(" LOSS ".parse::<Outcome>().unwrap(), Outcome::Loss);
        assert!("draw".parse::<Outcome>().is_err());
    }

    #[test]
    fn direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Sell).unwrap(), "\"SELL\"");
    }
}
