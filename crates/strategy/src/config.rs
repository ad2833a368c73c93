use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Pair, Result, DEFAULT_PAIRS, DEFAULT_TRADE_AMOUNT};

/// Top-level signal config file (TOML). Every field is optional.
///
/// Example `config/signals.toml`:
/// ```toml
/// pairs = ["USD/INR", "EUR/USD"]
/// trade_amount = "$1"
///
/// [rules]
/// oversold = 30.0
/// overbought = 70.0
///
/// [confidence]
/// min = 95.0
/// max = 100.0
///
/// [filter]
/// rsi_tolerance = 5.0
/// macd_tolerance = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalFileConfig {
    /// Evaluation order; earlier pairs win confidence ties.
    pub pairs: Vec<String>,
    pub trade_amount: String,
    pub rules: RulesConfig,
    pub confidence: ConfidenceConfig,
    pub filter: FilterConfig,
}

/// RSI thresholds for the direction rules.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    pub oversold: f64,
    pub overbought: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub min: f64,
    pub max: f64,
}

/// Similarity tolerances against past losing signals.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub rsi_tolerance: f64,
    pub macd_tolerance: f64,
}

impl Default for SignalFileConfig {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_PAIRS.iter().map(|p| p.to_string()).collect(),
            trade_amount: DEFAULT_TRADE_AMOUNT.to_string(),
            rules: RulesConfig::default(),
            confidence: ConfidenceConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            min: 95.0,
            max: 100.0,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            rsi_tolerance: 5.0,
            macd_tolerance: 0.5,
        }
    }
}

impl SignalFileConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read signal config at '{}': {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Load from `path`, or fall back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No signal config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let cfg: SignalFileConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse signal config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn pairs(&self) -> Vec<Pair> {
        self.pairs.iter().map(|p| Pair::new(p.as_str())).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(Error::Config("at least one pair must be configured".into()));
        }
        let numbers = [
            ("rules.oversold", self.rules.oversold),
            ("rules.overbought", self.rules.overbought),
            ("confidence.min", self.confidence.min),
            ("confidence.max", self.confidence.max),
            ("filter.rsi_tolerance", self.filter.rsi_tolerance),
            ("filter.macd_tolerance", self.filter.macd_tolerance),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Config(format!("{name} must be a finite number, got {value}")));
        }
        if self.rules.oversold >= self.rules.overbought {
            return Err(Error::Config(format!(
                "oversold ({}) must be below overbought ({})",
                self.rules.oversold, self.rules.overbought
            )));
        }
        if self.confidence.min >= self.confidence.max {
            return Err(Error::Config(format!(
                "confidence.min ({}) must be below confidence.max ({})",
                self.confidence.min, self.confidence.max
            )));
        }
        if self.filter.rsi_tolerance < 0.0 || self.filter.macd_tolerance < 0.0 {
            return Err(Error::Config("filter tolerances must not be negative".into()));
        }
        Ok(())
    }
}
