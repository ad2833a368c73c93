use chrono::Utc;
use common::{CandleTime, Direction, IndicatorSnapshot, Outcome, Pair, Signal};
use ledger::{OutcomeTracker, WinStats};
use proptest::prelude::*;
use uuid::Uuid;

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Win), Just(Outcome::Loss)]
}

proptest! {
    /// Win rate is a percentage and the counts add up.
    #[test]
    fn win_rate_is_a_percentage(outcomes in prop::collection::vec(outcome(), 0..200)) {
        let stats = WinStats::from_outcomes(&outcomes);
        prop_assert_eq!(stats.wins + stats.losses, stats.total);
        prop_assert_eq!(stats.total, outcomes.len());
        prop_assert!((0.0..=100.0).contains(&stats.win_rate));
    }

    /// Reporting outcomes never changes history length, and every LOSS
    /// lands in the bad-signal store.
    #[test]
    fn reports_never_grow_history(outcomes in prop::collection::vec(outcome(), 1..30)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let tracker = OutcomeTracker::default();
            tracker.record_cycle(Some(Signal {
                id: Uuid::new_v4(),
                pair: Pair::new("USD/MXN"),
                direction: Direction::Sell,
                confidence: 99.1,
                trade_amount: "$1".into(),
                candle_time: CandleTime::new("12:00"),
                snapshot: IndicatorSnapshot { rsi: 80.0, macd: -0.4, ema: 17.0 },
                created_at: Utc::now(),
            })).await;

            for o in &outcomes {
                tracker.report_outcome(*o).await;
            }

            let losses = outcomes.iter().filter(|o| **o == Outcome::Loss).count();
            assert_eq!(tracker.history().await.len(), 1);
            assert_eq!(tracker.bad_signals().len().await, losses);
            assert_eq!(tracker.stats().await.total, 1);
        });
    }
}
