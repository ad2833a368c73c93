use common::Signal;

use crate::config::FilterConfig;

/// Suppresses candidates that look like signals which previously lost.
///
/// Pure predicate over a slice of past losses; it never touches the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadSignalFilter {
    pub rsi_tolerance: f64,
    pub macd_tolerance: f64,
}

impl BadSignalFilter {
    pub fn new(rsi_tolerance: f64, macd_tolerance: f64) -> Self {
        Self {
            rsi_tolerance,
            macd_tolerance,
        }
    }

    /// Same pair, same direction, RSI and MACD both strictly within tolerance.
    /// Compares raw snapshot values.
    pub fn resembles(&self, bad: &Signal, candidate: &Signal) -> bool {
        bad.pair == candidate.pair
            && bad.direction == candidate.direction
            && (bad.snapshot.rsi - candidate.snapshot.rsi).abs() < self.rsi_tolerance
            && (bad.snapshot.macd - candidate.snapshot.macd).abs() < self.macd_tolerance
    }

    pub fn is_suppressed(&self, candidate: &Signal, bad_signals: &[Signal]) -> bool {
        bad_signals.iter().any(|bad| self.resembles(bad, candidate))
    }
}

impl From<FilterConfig> for BadSignalFilter {
    fn from(cfg: FilterConfig) -> Self {
        Self::new(cfg.rsi_tolerance, cfg.macd_tolerance)
    }
}

impl Default for BadSignalFilter {
    fn default() -> Self {
        FilterConfig::default().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CandleTime, Direction, IndicatorSnapshot, Pair};
    use uuid::Uuid;

    fn signal(pair: &str, direction: Direction, rsi: f64, macd: f64) -> Signal {
        Signal {
            id: Uuid::new_v4(),
            pair: Pair::new(pair),
            direction,
            confidence: 97.0,
            trade_amount: "$1".into(),
            candle_time: CandleTime::new("9:05"),
            snapshot: IndicatorSnapshot { rsi, macd, ema: 1.0 },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn close_match_is_suppressed() {
        let filter = BadSignalFilter::default();
        let bad = vec![signal("USD/INR", Direction::Buy, 25.0, 1.2)];
        let candidate = signal("USD/INR", Direction::Buy, 28.0, 1.0);
        assert!(filter.is_suppressed(&candidate, &bad));
    }

    #[test]
    fn different_pair_is_not_suppressed() {
        let filter = BadSignalFilter::default();
        let bad = vec![signal("USD/INR", Direction::Buy, 25.0, 1.2)];
        let candidate = signal("USD/BRL", Direction::Buy, 25.0, 1.2);
        assert!(!filter.is_suppressed(&candidate, &bad));
    }

    #[test]
    fn different_direction_is_not_suppressed() {
        let filter = BadSignalFilter::default();
        let bad = vec![signal("USD/INR", Direction::Sell, 25.0, 1.2)];
        let candidate = signal("USD/INR", Direction::Buy, 25.0, 1.2);
        assert!(!filter.is_suppressed(&candidate, &bad));
    }

    #[test]
    fn rsi_beyond_tolerance_is_not_suppressed() {
        let filter = BadSignalFilter::default();
        let bad = vec![signal("USD/INR", Direction::Buy, 20.0, 1.2)];
        assert!(!filter.is_suppressed(&signal("USD/INR", Direction::Buy, 25.0, 1.2), &bad));
        assert!(!filter.is_suppressed(&signal("USD/INR", Direction::Buy, 26.0, 1.2), &bad));
    }

    #[test]
    fn macd_beyond_tolerance_is_not_suppressed() {
        let filter = BadSignalFilter::default();
        let bad = vec![signal("USD/INR", Direction::Buy, 25.0, 1.0)];
        assert!(!filter.is_suppressed(&signal("USD/INR", Direction::Buy, 25.0, 1.5), &bad));
        assert!(!filter.is_suppressed(&signal("USD/INR", Direction::Buy, 25.0, 0.25), &bad));
    }

    #[test]
    fn raw_values_are_compared_not_rounded_ones() {
        let filter = BadSignalFilter::default();
        // 24.996 displays as "25.00"; raw distance to 29.999 is just over 5.
        let bad = vec![signal("USD/INR", Direction::Buy, 24.996, 1.0)];
        let candidate = signal("USD/INR", Direction::Buy, 29.999, 1.0);
        assert_eq!(bad[0].rsi_display(), "25.00");
        assert!(!filter.is_suppressed(&candidate, &bad));
    }

    #[test]
    fn any_matching_entry_suppresses() {
        let filter = BadSignalFilter::default();
        let bad = vec![
            signal("EUR/USD", Direction::Sell, 80.0, -1.0),
            signal("USD/INR", Direction::Buy, 10.0, 3.0),
            signal("USD/INR", Direction::Buy, 26.0, 1.1),
        ];
        assert!(filter.is_suppressed(&signal("USD/INR", Direction::Buy, 25.0, 1.2), &bad));
    }

    #[test]
    fn empty_store_never_suppresses() {
        let filter = BadSignalFilter::default();
        assert!(!filter.is_suppressed(&signal("USD/INR", Direction::Buy, 25.0, 1.2), &[]));
    }
}
