use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{info, warn};

use common::{
    CycleReport, CycleTrigger, EngineCommand, EngineState, Error, Outcome, Result, Signal,
};
use ledger::{HistoryEntry, OutcomeTracker, WinStats};

use crate::selector::SignalSelector;

/// Cloneable handle for callers: manual triggers, outcome reports and reads.
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    state: Arc<RwLock<EngineState>>,
    cycle_tx: broadcast::Sender<CycleReport>,
    ledger: Arc<OutcomeTracker>,
}

impl EngineHandle {
    pub async fn send(&self, cmd: EngineCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| Error::EngineUnavailable)
    }

    pub async fn start(&self) -> Result<()> {
        self.send(EngineCommand::Start).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(EngineCommand::Stop).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(EngineCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(EngineCommand::Resume).await
    }

    /// Run a cycle now (queued behind any cycle in flight) and return the
    /// resulting current signal, `None` when no pair produced one.
    pub async fn generate_signal(&self) -> Result<Option<Signal>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::GenerateNow(reply_tx)).await?;
        reply_rx.await.map_err(|_| Error::EngineUnavailable)
    }

    /// Report WIN/LOSS for the current signal. No-op without one.
    pub async fn report_outcome(&self, outcome: Outcome) -> Option<Signal> {
        self.ledger.report_outcome(outcome).await
    }

    pub async fn current_signal(&self) -> Option<Signal> {
        self.ledger.current().await
    }

    /// Newest first.
    pub async fn history(&self) -> Vec<Signal> {
        self.ledger.history().await
    }

    pub async fn history_with_outcomes(&self) -> Vec<HistoryEntry> {
        self.ledger.history_with_outcomes().await
    }

    pub async fn stats(&self) -> WinStats {
        self.ledger.stats().await
    }

    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    /// Subscribe to a report of every completed cycle.
    pub fn subscribe_cycles(&self) -> broadcast::Receiver<CycleReport> {
        self.cycle_tx.subscribe()
    }
}

/// The scheduler: owns the selector and runs every cycle on its own task.
///
/// Timer ticks and manual triggers are handled one at a time by `run`, so
/// cycles never overlap.
pub struct Engine {
    selector: SignalSelector,
    ledger: Arc<OutcomeTracker>,
    interval: Duration,
    state: Arc<RwLock<EngineState>>,
    cycle_tx: broadcast::Sender<CycleReport>,
    command_rx: mpsc::Receiver<EngineCommand>,
}

impl Engine {
    pub fn new(
        selector: SignalSelector,
        ledger: Arc<OutcomeTracker>,
        interval: Duration,
    ) -> (Self, EngineHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (cycle_tx, _) = broadcast::channel(64);
        let state = Arc::new(RwLock::new(EngineState::Stopped));

        let handle = EngineHandle {
            command_tx,
            state: state.clone(),
            cycle_tx: cycle_tx.clone(),
            ledger: ledger.clone(),
        };

        let engine = Engine {
            selector,
            ledger,
            interval,
            state,
            cycle_tx,
            command_rx,
        };

        (engine, handle)
    }

    /// Run the engine until every handle is dropped. Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!(
            pairs = self.selector.pairs().len(),
            interval_secs = self.interval.as_secs(),
            "Engine initialized in Stopped state. Waiting for Start command."
        );

        let mut ticker: Option<Interval> = None;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(EngineCommand::Start) => {
                        if *self.state.read().await == EngineState::Running {
                            info!("Engine already running");
                            continue;
                        }
                        info!("Engine started, first cycle in {:?}", self.interval);
                        *self.state.write().await = EngineState::Running;
                        ticker = Some(self.new_ticker());
                    }

                    Some(EngineCommand::Stop) => {
                        info!("Engine stopped, timer cycles disabled");
                        *self.state.write().await = EngineState::Stopped;
                        ticker = None;
                    }

                    Some(EngineCommand::Pause) => {
                        let mut state = self.state.write().await;
                        if *state == EngineState::Running {
                            info!("Engine paused, timer cycles skipped");
                            *state = EngineState::Paused;
                        }
                    }

                    Some(EngineCommand::Resume) => {
                        let mut state = self.state.write().await;
                        if *state == EngineState::Paused {
                            info!("Engine resumed");
                            *state = EngineState::Running;
                        }
                    }

                    Some(EngineCommand::GenerateNow(reply)) => {
                        let signal = self.cycle(CycleTrigger::Manual).await;
                        let _ = reply.send(signal);
                    }

                    None => {
                        warn!("Engine command channel closed, shutting down");
                        break;
                    }
                },

                _ = next_tick(&mut ticker) => {
                    if *self.state.read().await == EngineState::Running {
                        self.cycle(CycleTrigger::Timer).await;
                    }
                }
            }
        }
    }

    fn new_ticker(&self) -> Interval {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    async fn cycle(&self, trigger: CycleTrigger) -> Option<Signal> {
        let report = self.selector.run_cycle(trigger).await;
        self.ledger.record_cycle(report.signal.clone()).await;
        let signal = report.signal.clone();
        // No subscribers is fine.
        let _ = self.cycle_tx.send(report);
        signal
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}
