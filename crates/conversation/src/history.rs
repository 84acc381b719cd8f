use std::sync::{Arc, Mutex, MutexGuard};

use biasbuster_core::ChatSummary;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::ChatBackend;
use crate::error::ChatError;

/// Cached chat list.
///
/// Every refresh takes a ticket before it goes to the network; a result is
/// applied only if no later ticket has been applied already, so an older
/// response arriving late never overwrites a newer list.
#[derive(Clone)]
pub struct HistoryCache {
    backend: Arc<dyn ChatBackend>,
    inner: Arc<Mutex<HistoryState>>,
}

#[derive(Default)]
struct HistoryState {
    entries: Vec<ChatSummary>,
    issued: u64,
    applied: u64,
}

impl HistoryCache {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(HistoryState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, HistoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the cached list, in server order.
    pub fn entries(&self) -> Vec<ChatSummary> {
        self.state().entries.clone()
    }

    /// Fetch the list and replace the cache with it.
    ///
    /// On failure the previous list is kept and the error returned.
    pub async fn refresh(&self) -> Result<Vec<ChatSummary>, ChatError> {
        let ticket = {
            let mut state = self.state();
            state.issued += 1;
            state.issued
        };

        let fetched = self
            .backend
            .fetch_history()
            .await
            .map_err(ChatError::Network)?;

        let mut state = self.state();
        if ticket > state.applied {
            state.entries = fetched;
            state.applied = ticket;
        } else {
            debug!(ticket, applied = state.applied, "discarding stale history");
        }
        Ok(state.entries.clone())
    }

    /// Refresh on the runtime without waiting for it.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.refresh().await {
                warn!("history refresh failed: {err}");
            }
        })
    }

    /// Drop a chat from the cached list without a round trip.
    pub fn forget(&self, chat_id: &str) {
        self.state().entries.retain(|c| c.id != chat_id);
    }
}
