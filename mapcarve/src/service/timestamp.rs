//! Dataset timestamp cache.

use crate::extract::ExtractTool;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Cached dataset timestamp with a refresh window.
///
/// The timestamp query opens the planet database, so it is rate-limited:
/// within the window every caller shares the cached value. The internal
/// lock is held across a refresh, which makes concurrent callers produce a
/// single query rather than a stampede. A failed refresh logs, keeps the
/// previous value, and still starts a new window so a broken tool is not
/// hammered.
#[derive(Debug)]
pub struct TimestampCache {
    refresh: Duration,
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    value: String,
    fetched_at: Option<Instant>,
}

impl TimestampCache {
    pub fn new(refresh: Duration) -> Self {
        Self {
            refresh,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns the cached timestamp, refreshing it when the window lapsed.
    pub async fn get(&self, tool: &ExtractTool) -> String {
        let mut state = self.state.lock().await;
        let lapsed = state
            .fetched_at
            .map_or(true, |at| at.elapsed() > self.refresh);

        if lapsed {
            match tool.query_timestamp().await {
                Ok(value) => {
                    state.value = value;
                    state.fetched_at = Some(Instant::now());
                }
                Err(err) => {
                    warn!(error = %err, "dataset timestamp query failed, keeping cached value");
                    state.fetched_at = Some(Instant::now());
                }
            }
        }
        state.value.clone()
    }
}
