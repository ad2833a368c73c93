use std::sync::Arc;

use chrono::{Local, Utc};
use futures_util::future::join_all;
use tracing::{debug, info};

use common::{CycleReport, CycleTrigger, IndicatorSource, Pair, Signal};
use ledger::BadSignalStore;
use strategy::{BadSignalFilter, SignalEvaluator, SignalFileConfig};

use crate::snapshot::IndicatorClient;

/// Runs fetch → evaluate → filter over every configured pair and keeps the
/// most confident candidate.
pub struct SignalSelector {
    client: IndicatorClient,
    evaluator: SignalEvaluator,
    filter: BadSignalFilter,
    /// Evaluation order; earlier pairs win confidence ties.
    pairs: Vec<Pair>,
    bad_signals: BadSignalStore,
}

impl SignalSelector {
    pub fn new(
        source: Arc<dyn IndicatorSource>,
        evaluator: SignalEvaluator,
        filter: BadSignalFilter,
        pairs: Vec<Pair>,
        bad_signals: BadSignalStore,
    ) -> Self {
        Self {
            client: IndicatorClient::new(source),
            evaluator,
            filter,
            pairs,
            bad_signals,
        }
    }

    pub fn from_config(
        source: Arc<dyn IndicatorSource>,
        cfg: &SignalFileConfig,
        bad_signals: BadSignalStore,
    ) -> Self {
        Self::new(
            source,
            SignalEvaluator::from_config(cfg),
            cfg.filter.into(),
            cfg.pairs(),
            bad_signals,
        )
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// One full cycle. Snapshots for all pairs are fetched concurrently; a
    /// slow or failing pair only degrades its own snapshot to defaults.
    pub async fn run_cycle(&self, trigger: CycleTrigger) -> CycleReport {
        let started_at = Utc::now();
        let snapshots = join_all(self.pairs.iter().map(|pair| self.client.snapshot(pair))).await;

        let now = Local::now();
        let bad_signals = self.bad_signals.snapshot().await;
        let (mut holds, mut suppressed) = (0, 0);
        let mut candidates = Vec::new();

        for (pair, snapshot) in self.pairs.iter().zip(snapshots) {
            let Some(candidate) = self.evaluator.evaluate(pair, snapshot, &now) else {
                holds += 1;
                continue;
            };
            if self.filter.is_suppressed(&candidate, &bad_signals) {
                debug!(
                    pair = %pair,
                    direction = %candidate.direction,
                    rsi = candidate.snapshot.rsi,
                    macd = candidate.snapshot.macd,
                    "Candidate resembles a past loss, suppressed"
                );
                suppressed += 1;
                continue;
            }
            candidates.push(candidate);
        }

        let signal = select_best(candidates);
        match &signal {
            Some(s) => info!(
                ?trigger,
                pair = %s.pair,
                direction = %s.direction,
                confidence = %s.confidence_display(),
                holds,
                suppressed,
                "Cycle selected a signal"
            ),
            None => info!(?trigger, holds, suppressed, "Cycle produced no signal"),
        }

        CycleReport {
            trigger,
            signal,
            evaluated: self.pairs.len(),
            holds,
            suppressed,
            started_at,
        }
    }
}

/// Highest confidence wins; on a tie the earliest candidate is kept.
pub fn select_best(candidates: impl IntoIterator<Item = Signal>) -> Option<Signal> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(best) if best.confidence >= candidate.confidence => Some(best),
        _ => Some(candidate),
    })
}
