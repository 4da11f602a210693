//! Keyed stale-while-revalidate cache with request coalescing.
//!
//! Every fetch runs as its own task and writes its result back into the map
//! when it completes, so a background refresh finishes even when nobody is
//! awaiting it. Callers that need the value await a shared handle to that
//! task. The map lock is only held for bookkeeping, never across an await.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::CacheError;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, CacheError>>>;

/// What a read of a key would do right now.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Nothing cached and nothing in flight.
    Missing,
    /// No value yet; a fetch is in flight.
    Pending,
    Fresh,
    /// Expired and no refresh running; the next read starts one.
    Stale,
    /// Expired; a background refresh is in flight.
    Refreshing,
}

struct Cached<V> {
    value: V,
    stored_at: Instant,
}

struct Inflight<V> {
    id: u64,
    future: SharedFetch<V>,
}

struct Slot<V> {
    cached: Option<Cached<V>>,
    inflight: Option<Inflight<V>>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            cached: None,
            inflight: None,
        }
    }
}

type Entries<K, V> = Arc<Mutex<HashMap<K, Slot<V>>>>;

fn lock<K, V>(entries: &Mutex<HashMap<K, Slot<V>>>) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
    // Slots are replaced whole; a panic elsewhere cannot leave one half-written.
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client-side cache of `K → V`.
///
/// Cloning is cheap; clones share entries.
pub struct ClientCache<K, V> {
    entries: Entries<K, V>,
    next_fetch: Arc<AtomicU64>,
    config: CacheConfig,
}

impl<K, V> Clone for ClientCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            next_fetch: Arc::clone(&self.next_fetch),
            config: self.config,
        }
    }
}

impl<K, V> ClientCache<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_fetch: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Read `key` using the configured default TTL.
    pub async fn get<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.get_with_ttl(key, self.config.default_ttl, fetch).await
    }

    /// Read `key`, treating a cached value older than `ttl` as stale.
    ///
    /// - fresh: returned without calling `fetch`
    /// - stale: returned immediately; one background refresh is started
    ///   unless one is already running
    /// - missing: the caller waits on the in-flight fetch, starting it if
    ///   needed; a failure reaches every waiter and nothing is cached
    pub async fn get_with_ttl<F, Fut, E>(&self, key: K, ttl: Duration, fetch: F) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let pending = {
            let mut entries = lock(&self.entries);
            let slot = entries.entry(key.clone()).or_default();

            if let Some(cached) = &slot.cached {
                let value = cached.value.clone();
                if cached.stored_at.elapsed() < ttl {
                    return Ok(value);
                }
                if slot.inflight.is_none() {
                    debug!(%key, "serving stale entry, refreshing in background");
                    slot.inflight = Some(self.spawn_fetch(key, fetch()));
                }
                return Ok(value);
            }

            slot.inflight
                .get_or_insert_with(|| {
                    debug!(%key, "cache miss");
                    self.spawn_fetch(key, fetch())
                })
                .future
                .clone()
        };

        pending.await
    }

    fn spawn_fetch<Fut, E>(&self, key: K, fetch: Fut) -> Inflight<V>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let id = self.next_fetch.fetch_add(1, Ordering::Relaxed);
        let entries = Arc::clone(&self.entries);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(CacheError::Fetch {
                    key: task_key.to_string(),
                    message: e.to_string(),
                }),
                Err(_) => {
                    warn!(key = %task_key, "fetch panicked");
                    Err(CacheError::FetchAborted {
                        key: task_key.to_string(),
                    })
                }
            };
            settle(&entries, &task_key, id, &result);
            result
        });

        // The task can still be cancelled (runtime shutdown); release the slot then too.
        let entries = Arc::clone(&self.entries);
        let future = async move {
            match handle.await {
                Ok(result) => result,
                Err(_) => {
                    let result = Err(CacheError::FetchAborted {
                        key: key.to_string(),
                    });
                    settle(&entries, &key, id, &result);
                    result
                }
            }
        }
        .boxed()
        .shared();

        Inflight { id, future }
    }

    /// Drop the entry for `key`. A fetch already in flight still answers its
    /// waiters but its result is not stored.
    pub fn invalidate(&self, key: &K) {
        lock(&self.entries).remove(key);
    }

    pub fn invalidate_all(&self) {
        lock(&self.entries).clear();
    }

    pub fn state(&self, key: &K) -> EntryState {
        self.state_with_ttl(key, self.config.default_ttl)
    }

    pub fn state_with_ttl(&self, key: &K, ttl: Duration) -> EntryState {
        let entries = lock(&self.entries);
        let Some(slot) = entries.get(key) else {
            return EntryState::Missing;
        };
        match (&slot.cached, slot.inflight.is_some()) {
            (None, false) => EntryState::Missing,
            (None, true) => EntryState::Pending,
            (Some(c), _) if c.stored_at.elapsed() < ttl => EntryState::Fresh,
            (Some(_), true) => EntryState::Refreshing,
            (Some(_), false) => EntryState::Stale,
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries)
            .values()
            .filter(|slot| slot.cached.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record a finished fetch, unless the slot was invalidated or handed to a
/// newer fetch in the meantime.
fn settle<K, V>(entries: &Mutex<HashMap<K, Slot<V>>>, key: &K, id: u64, result: &Result<V, CacheError>)
where
    K: Eq + Hash + Display,
    V: Clone,
{
    let mut entries = lock(entries);
    let Some(slot) = entries.get_mut(key) else {
        debug!(%key, "fetch finished after invalidation; result not cached");
        return;
    };
    if slot.inflight.as_ref().is_none_or(|i| i.id != id) {
        debug!(%key, "fetch superseded; result not cached");
        return;
    }
    slot.inflight = None;

    match result {
        Ok(value) => {
            slot.cached = Some(Cached {
                value: value.clone(),
                stored_at: Instant::now(),
            });
        }
        Err(e) if slot.cached.is_some() => {
            warn!(%key, error = %e, "background refresh failed; keeping stale value");
        }
        Err(e) => {
            debug!(%key, error = %e, "fetch failed; nothing cached");
            entries.remove(key);
        }
    }
}
