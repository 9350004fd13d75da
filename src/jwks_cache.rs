use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::jwk_set::KeySet;
use crate::Error;

/// Most recently fetched key set, the time it was fetched at, and the outcome of the last refresh.
#[derive(Debug, Default)]
struct CachedKeySet {
    keys: Option<Arc<KeySet>>,
    fetched_at: Option<i64>,
    /// Number of refreshes attempted so far.
    refreshes: u64,
    /// Failure of the last refresh, if it failed.
    failure: Option<Error>,
}

impl CachedKeySet {
    /// Returns the cached keys unless they were never fetched or are `expiry` seconds old or older.
    fn fresh(&self, now: i64, expiry: Duration) -> Option<Arc<KeySet>> {
        let keys = self.keys.as_ref()?;
        let age = now.saturating_sub(self.fetched_at?);
        let expiry = i64::try_from(expiry.as_secs()).unwrap_or(i64::MAX);
        (age < expiry).then(|| Arc::clone(keys))
    }

    /// Failure of a refresh that ran after `refreshes_seen`, shared with whoever waited for it.
    fn failure_since(&self, refreshes_seen: u64) -> Option<Error> {
        if self.refreshes == refreshes_seen {
            return None;
        }
        self.failure.as_ref().and_then(Error::without_source)
    }
}

/// Time-limited cache for a single key set.
///
/// Fresh lookups only take a read lock. Refreshes are serialized by `refresh_lock`. Callers that queued up behind a
/// refresh share its outcome: its keys if it succeeded, its error if it failed.
#[derive(Debug)]
pub struct KeyCache {
    entry: RwLock<CachedKeySet>,
    refresh_lock: Mutex<()>,
    expiry: Duration,
}

impl KeyCache {
    pub fn new(expiry: Duration) -> Self {
        Self {
            entry: RwLock::new(CachedKeySet::default()),
            refresh_lock: Mutex::new(()),
            expiry,
        }
    }

    /// Returns the cached key set, calling `fetch` to replace it when it is missing or stale.
    ///
    /// Errors of `fetch` are passed through and leave the previously cached keys untouched.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        clock: &dyn Clock,
        fetch: F,
    ) -> Result<Arc<KeySet>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<KeySet, Error>>,
    {
        let refreshes_seen = {
            let entry = self.entry.read().await;
            if let Some(keys) = entry.fresh(clock.now(), self.expiry) {
                debug!("using cached JWK set");
                return Ok(keys);
            }
            entry.refreshes
        };

        let _refresh_guard = self.refresh_lock.lock().await;
        {
            let entry = self.entry.read().await;
            if let Some(keys) = entry.fresh(clock.now(), self.expiry) {
                debug!("JWK set was refreshed concurrently");
                return Ok(keys);
            }
            if let Some(err) = entry.failure_since(refreshes_seen) {
                debug!(error = %err, "concurrent JWK set refresh failed");
                return Err(err);
            }
        }

        info!(expiry_secs = self.expiry.as_secs(), "JWK set cache is stale, refreshing");
        let result = fetch().await;

        let mut entry = self.entry.write().await;
        entry.refreshes = entry.refreshes.wrapping_add(1);
        match result {
            Ok(keys) => {
                let keys = Arc::new(keys);
                entry.keys = Some(Arc::clone(&keys));
                entry.fetched_at = Some(clock.now());
                entry.failure = None;
                Ok(keys)
            }
            Err(err) => {
                entry.failure = err.without_source();
                Err(err)
            }
        }
    }

    /// Number of keys currently cached, stale or not.
    pub async fn key_count(&self) -> usize {
        self.entry
            .read()
            .await
            .keys
            .as_ref()
            .map_or(0, |keys| keys.len())
    }
}
