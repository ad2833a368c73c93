use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use tracing::debug;
use uuid::Uuid;

use common::{CandleTime, Direction, IndicatorSnapshot, Pair, Signal};

use crate::config::{RulesConfig, SignalFileConfig};
use crate::confidence::{ConfidenceScorer, RandomConfidence};

/// RSI/MACD rules deciding the direction of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionRules {
    pub oversold: f64,
    pub overbought: f64,
}

impl DirectionRules {
    pub fn new(oversold: f64, overbought: f64) -> Self {
        Self { oversold, overbought }
    }

    /// BUY when oversold with positive MACD, SELL when overbought with
    /// negative MACD. `None` is HOLD.
    pub fn direction(&self, snapshot: &IndicatorSnapshot) -> Option<Direction> {
        if snapshot.rsi < self.oversold && snapshot.macd > 0.0 {
            Some(Direction::Buy)
        } else if snapshot.rsi > self.overbought && snapshot.macd < 0.0 {
            Some(Direction::Sell)
        } else {
            None
        }
    }
}

impl From<RulesConfig> for DirectionRules {
    fn from(cfg: RulesConfig) -> Self {
        Self::new(cfg.oversold, cfg.overbought)
    }
}

impl Default for DirectionRules {
    fn default() -> Self {
        RulesConfig::default().into()
    }
}

/// The clock minute after `now`, formatted `H:MM` in `now`'s timezone.
pub fn candle_time<Tz: TimeZone>(now: &DateTime<Tz>) -> CandleTime {
    let next = now.clone() + Duration::minutes(1);
    CandleTime::new(format!("{}:{:02}", next.hour(), next.minute()))
}

/// Turns one pair's indicator snapshot into a candidate signal.
#[derive(Clone)]
pub struct SignalEvaluator {
    rules: DirectionRules,
    scorer: Arc<dyn ConfidenceScorer>,
    trade_amount: String,
}

impl SignalEvaluator {
    pub fn new(
        rules: DirectionRules,
        scorer: Arc<dyn ConfidenceScorer>,
        trade_amount: impl Into<String>,
    ) -> Self {
        Self {
            rules,
            scorer,
            trade_amount: trade_amount.into(),
        }
    }

    pub fn from_config(cfg: &SignalFileConfig) -> Self {
        Self::new(
            cfg.rules.into(),
            Arc::new(RandomConfidence::from_config(&cfg.confidence)),
            cfg.trade_amount.clone(),
        )
    }

    /// Returns `None` for HOLD. The result still has to pass the bad-signal filter.
    pub fn evaluate<Tz: TimeZone>(
        &self,
        pair: &Pair,
        snapshot: IndicatorSnapshot,
        now: &DateTime<Tz>,
    ) -> Option<Signal> {
        let Some(direction) = self.rules.direction(&snapshot) else {
            debug!(pair = %pair, rsi = snapshot.rsi, macd = snapshot.macd, "HOLD");
            return None;
        };

        Some(Signal {
            id: Uuid::new_v4(),
            pair: pair.clone(),
            direction,
            confidence: self.scorer.score(pair),
            trade_amount: self.trade_amount.clone(),
            candle_time: candle_time(now),
            snapshot,
            created_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for SignalEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalEvaluator")
            .field("rules", &self.rules)
            .field("trade_amount", &self.trade_amount)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl ConfidenceScorer for Fixed {
        fn score(&self, _pair: &Pair) -> f64 {
            self.0
        }
    }

    fn snap(rsi: f64, macd: f64, ema: f64) -> IndicatorSnapshot {
        IndicatorSnapshot { rsi, macd, ema }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, h, m, s).unwrap()
    }

    fn evaluator() -> SignalEvaluator {
        SignalEvaluator::new(DirectionRules::default(), Arc::new(Fixed(97.25)), "$1")
    }

    #[test]
    fn oversold_with_positive_macd_is_buy() {
        let signal = evaluator()
            .evaluate(&Pair::new("USD/INR"), snap(25.0, 1.2, 1.1), &at(9, 4, 30))
            .expect("expected a BUY");
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.pair, Pair::new("USD/INR"));
        assert_eq!(signal.confidence, 97.25);
        assert_eq!(signal.trade_amount, "$1");
        assert_eq!(signal.candle_time, CandleTime::new("9:05"));
        assert_eq!(signal.rsi_display(), "25.00");
        assert_eq!(signal.macd_display(), "1.20");
        assert_eq!(signal.ema_display(), "1.10");
    }

    #[test]
    fn overbought_with_negative_macd_is_sell() {
        let signal = evaluator()
            .evaluate(&Pair::new("USD/INR"), snap(75.0, -0.3, 0.0), &at(14, 0, 0))
            .expect("expected a SELL");
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn neutral_snapshot_is_hold() {
        assert!(evaluator()
            .evaluate(&Pair::new("USD/INR"), snap(50.0, 0.0, 0.0), &at(14, 0, 0))
            .is_none());
    }

    #[test]
    fn default_snapshot_is_hold() {
        let rules = DirectionRules::default();
        assert_eq!(rules.direction(&IndicatorSnapshot::default()), None);
    }

    #[test]
    fn thresholds_are_strict() {
        let rules = DirectionRules::default();
        assert_eq!(rules.direction(&snap(30.0, 1.0, 0.0)), None);
        assert_eq!(rules.direction(&snap(70.0, -1.0, 0.0)), None);
        assert_eq!(rules.direction(&snap(29.99, 0.0, 0.0)), None);
        assert_eq!(rules.direction(&snap(70.01, 0.0, 0.0)), None);
    }

    #[test]
    fn oversold_with_negative_macd_is_hold() {
        let rules = DirectionRules::default();
        assert_eq!(rules.direction(&snap(10.0, -1.0, 0.0)), None);
        assert_eq!(rules.direction(&snap(90.0, 1.0, 0.0)), None);
    }

    #[test]
    fn candle_time_pads_minutes_not_hours() {
        assert_eq!(candle_time(&at(9, 4, 59)), CandleTime::new("9:05"));
        assert_eq!(candle_time(&at(10, 59, 0)), CandleTime::new("11:00"));
        assert_eq!(candle_time(&at(23, 59, 10)), CandleTime::new("0:00"));
    }

    #[test]
    fn each_signal_gets_a_fresh_id() {
        let ev = evaluator();
        let a = ev.evaluate(&Pair::new("USD/INR"), snap(20.0, 1.0, 0.0), &at(9, 0, 0)).unwrap();
        let b = ev.evaluate(&Pair::new("USD/INR"), snap(20.0, 1.0, 0.0), &at(9, 0, 0)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.candle_time, b.candle_time);
    }
}
