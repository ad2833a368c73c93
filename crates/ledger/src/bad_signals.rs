use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use common::Signal;

/// Signals that were reported as losses.
///
/// Cloning yields another handle to the same store. The selector reads it
/// every cycle; only the outcome tracker appends. Entries never expire:
/// the store lives as long as the process unless `clear` is called.
#[derive(Debug, Clone, Default)]
pub struct BadSignalStore {
    entries: Arc<RwLock<Vec<Signal>>>,
}

impl BadSignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without dedup. Repeated identical losses add repeated entries.
    pub async fn insert(&self, signal: Signal) {
        let mut entries = self.entries.write().await;
        entries.push(signal);
        info!(total = entries.len(), "Bad signal recorded");
    }

    /// Copy of the current entries, oldest first.
    pub async fn snapshot(&self) -> Vec<Signal> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Forget every recorded loss.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Bad signal store cleared");
    }
}
