use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{CandleTime, Outcome, Signal};

use crate::BadSignalStore;

/// Aggregate of all reported outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinStats {
    pub wins: usize,
    pub losses: usize,
    pub total: usize,
    /// Percentage; `0.0` when nothing has been reported.
    pub win_rate: f64,
}

impl WinStats {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a Outcome>,
    {
        let (mut wins, mut losses) = (0, 0);
        for outcome in outcomes {
            match outcome {
                Outcome::Win => wins += 1,
                Outcome::Loss => losses += 1,
            }
        }
        let total = wins + losses;
        let win_rate = if total > 0 {
            wins as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            wins,
            losses,
            total,
            win_rate,
        }
    }

    /// Two-decimal percentage, e.g. `"60.00"`.
    pub fn win_rate_display(&self) -> String {
        format!("{:.2}", self.win_rate)
    }
}

/// A history row joined with whatever outcome is recorded for its candle time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub signal: Signal,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Default)]
struct LedgerState {
    current: Option<Signal>,
    /// Newest first.
    history: VecDeque<Signal>,
    outcomes: HashMap<CandleTime, Outcome>,
}

/// Bookkeeping for generated signals and the outcomes users report on them.
///
/// Current signal, history and outcome map sit behind one lock so an outcome
/// report always lands on the signal that was current when it was made.
/// Lock order is ledger state, then bad-signal store.
#[derive(Debug)]
pub struct OutcomeTracker {
    state: RwLock<LedgerState>,
    bad_signals: BadSignalStore,
}

impl OutcomeTracker {
    pub fn new(bad_signals: BadSignalStore) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            bad_signals,
        }
    }

    pub fn bad_signals(&self) -> &BadSignalStore {
        &self.bad_signals
    }

    /// Record the result of one cycle. A signal becomes current and is
    /// prepended to history; `None` clears the current signal.
    pub async fn record_cycle(&self, signal: Option<Signal>) {
        let mut state = self.state.write().await;
        match signal {
            Some(signal) => {
                state.history.push_front(signal.clone());
                info!(
                    pair = %signal.pair,
                    direction = %signal.direction,
                    confidence = %signal.confidence_display(),
                    candle_time = %signal.candle_time,
                    history = state.history.len(),
                    "Signal recorded"
                );
                state.current = Some(signal);
            }
            None => {
                debug!("Cycle produced no signal, clearing current");
                state.current = None;
            }
        }
    }

    /// Attach `outcome` to the current signal. Without a current signal this
    /// is a no-op and returns `None`; otherwise returns the signal reported on.
    ///
    /// A LOSS also stores the signal as a bad signal.
    pub async fn report_outcome(&self, outcome: Outcome) -> Option<Signal> {
        let mut state = self.state.write().await;
        let Some(signal) = state.current.clone() else {
            debug!(%outcome, "Outcome reported with no current signal, ignoring");
            return None;
        };

        if let Some(previous) = state.outcomes.insert(signal.candle_time.clone(), outcome) {
            debug!(candle_time = %signal.candle_time, %previous, "Outcome overwritten");
        }
        info!(
            pair = %signal.pair,
            candle_time = %signal.candle_time,
            %outcome,
            "Outcome reported"
        );

        if outcome == Outcome::Loss {
            self.bad_signals.insert(signal.clone()).await;
        }
        Some(signal)
    }

    pub async fn current(&self) -> Option<Signal> {
        self.state.read().await.current.clone()
    }

    /// All generated signals, newest first.
    pub async fn history(&self) -> Vec<Signal> {
        self.state.read().await.history.iter().cloned().collect()
    }

    pub async fn history_with_outcomes(&self) -> Vec<HistoryEntry> {
        let state = self.state.read().await;
        state
            .history
            .iter()
            .map(|signal| HistoryEntry {
                outcome: state.outcomes.get(&signal.candle_time).copied(),
                signal: signal.clone(),
            })
            .collect()
    }

    pub async fn outcome_for(&self, candle_time: &CandleTime) -> Option<Outcome> {
        self.state.read().await.outcomes.get(candle_time).copied()
    }

    pub async fn stats(&self) -> WinStats {
        WinStats::from_outcomes(self.state.read().await.outcomes.values())
    }
}

impl Default for OutcomeTracker {
    fn default() -> Self {
        Self::new(BadSignalStore::new())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
