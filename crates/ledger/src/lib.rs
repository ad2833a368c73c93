pub mod bad_signals;
pub mod tracker;

pub use bad_signals::BadSignalStore;
pub use tracker::{HistoryEntry, OutcomeTracker, WinStats};
