//! Keyed query cache for data fetched from the backend.
//!
//! Inspired by TanStack Query. One `QueryCache` is owned by the application
//! context and shared by every view. Each key holds the result of its most
//! recent successful fetch, the last error, and the fetcher that produced it.
//!
//! Fetches run on tokio tasks. Their results come back over a channel and
//! are applied in [`QueryCache::poll`], which the UI loop calls on every
//! tick, so every state transition happens on the thread that owns the cache.
//!
//! # Example
//!
//! ```ignore
//! let api = api.clone();
//! cache.ensure(Employee::list_key(), move || {
//!     let api = api.clone();
//!     async move { api.list::<Employee>().await.map(Employee::wrap_list) }
//! });
//!
//! // In event loop tick
//! if cache.poll() {
//!     // Some entry changed, re-render
//! }
//!
//! match cache.state(&Employee::list_key()) {
//!     QueryState::Loading { .. } => render_spinner(),
//!     QueryState::Success(data) => render_data(data),
//!     QueryState::Error { error, .. } => render_error(error),
//!     QueryState::Idle => {}
//! }
//! ```

use crate::error::ApiError;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Anything usable as a cache key.
pub trait QueryKey: Clone + Eq + Hash + fmt::Debug + fmt::Display + 'static {}

impl<T> QueryKey for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + 'static {}

pub type FetchResult<V> = Result<V, ApiError>;

/// Handle to an in-flight (or already resolved) fetch. Every clone resolves
/// to the same outcome.
pub type Pending<V> = Shared<BoxFuture<'static, FetchResult<V>>>;

type Fetcher<V> = Arc<dyn Fn() -> BoxFuture<'static, FetchResult<V>> + Send + Sync>;

type Callback<V> = Box<dyn FnMut(&QueryEntry<V>)>;

/// What a consumer sees for one key
#[derive(Debug)]
pub enum QueryState<'a, V> {
  /// Nothing has been requested for this key
  Idle,
  /// A fetch is in flight; data from an earlier fetch is kept if any
  Loading { stale: Option<&'a V> },
  /// The latest fetch succeeded
  Success(&'a V),
  /// The latest fetch failed; data from an earlier fetch is kept if any
  Error {
    error: &'a ApiError,
    stale: Option<&'a V>,
  },
}

impl<'a, V> QueryState<'a, V> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading { .. })
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error { .. })
  }

  /// Best data available, whether fresh or retained from an earlier fetch.
  pub fn data(&self) -> Option<&'a V> {
    match self {
      QueryState::Success(data) => Some(*data),
      QueryState::Loading { stale } | QueryState::Error { stale, .. } => *stale,
      QueryState::Idle => None,
    }
  }

  pub fn error(&self) -> Option<&'a ApiError> {
    match self {
      QueryState::Error { error, .. } => Some(*error),
      _ => None,
    }
  }
}

/// Cached state for a single key.
pub struct QueryEntry<V> {
  data: Option<V>,
  error: Option<ApiError>,
  fetched_at: Option<Instant>,
  invalidated: bool,
  generation: u64,
  in_flight: Option<Pending<V>>,
  task: Option<JoinHandle<()>>,
  fetcher: Option<Fetcher<V>>,
}

impl<V> Default for QueryEntry<V> {
  fn default() -> Self {
    Self {
      data: None,
      error: None,
      fetched_at: None,
      invalidated: false,
      generation: 0,
      in_flight: None,
      task: None,
      fetcher: None,
    }
  }
}

impl<V> QueryEntry<V> {
  pub fn data(&self) -> Option<&V> {
    self.data.as_ref()
  }

  pub fn error(&self) -> Option<&ApiError> {
    self.error.as_ref()
  }

  pub fn is_loading(&self) -> bool {
    self.in_flight.is_some()
  }

  /// Set by `invalidate`, cleared by the next successful fetch.
  pub fn is_invalidated(&self) -> bool {
    self.invalidated
  }

  pub fn fetched_at(&self) -> Option<Instant> {
    self.fetched_at
  }

  fn is_fresh(&self, stale_time: Duration) -> bool {
    self.data().is_some()
      && self.error().is_none()
      && !self.is_invalidated()
      && self.fetched_at().is_some_and(|t| t.elapsed() < stale_time)
  }

  pub fn state(&self) -> QueryState<'_, V> {
    if self.is_loading() {
      return QueryState::Loading {
        stale: self.data.as_ref(),
      };
    }
    match (&self.error, &self.data) {
      (Some(error), stale) => QueryState::Error {
        error,
        stale: stale.as_ref(),
      },
      (None, Some(data)) => QueryState::Success(data),
      (None, None) => QueryState::Idle,
    }
  }
}

impl<V: fmt::Debug> fmt::Debug for QueryEntry<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("QueryEntry")
      .field("data", &self.data)
      .field("error", &self.error)
      .field("fetched_at", &self.fetched_at)
      .field("invalidated", &self.invalidated)
      .field("generation", &self.generation)
      .field("loading", &self.is_loading())
      .finish_non_exhaustive()
  }
}

/// Unsubscribe handle returned by [`QueryCache::subscribe`].
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription<K> {
  key: K,
  id: u64,
}

struct Completion<K, V> {
  key: K,
  generation: u64,
  result: FetchResult<V>,
}

/// Process-wide cache of fetched data, keyed by `K`.
pub struct QueryCache<K, V> {
  entries: HashMap<K, QueryEntry<V>>,
  subscribers: HashMap<K, Vec<(u64, Callback<V>)>>,
  next_subscription: u64,
  /// Shared by all keys, so a result from a removed entry never matches a
  /// new one
  next_generation: u64,
  stale_time: Duration,
  tx: mpsc::UnboundedSender<Completion<K, V>>,
  rx: mpsc::UnboundedReceiver<Completion<K, V>>,
}

impl<K, V> QueryCache<K, V>
where
  K: QueryKey + Send,
  V: Clone + Send + Sync + 'static,
{
  /// Create an empty cache. Data younger than `stale_time` is served
  /// without refetching.
  pub fn new(stale_time: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      entries: HashMap::new(),
      subscribers: HashMap::new(),
      next_subscription: 0,
      next_generation: 0,
      stale_time,
      tx,
      rx,
    }
  }

  /// Return the cached value for `key`, fetching it if there is no fresh
  /// entry.
  ///
  /// While a fetch for `key` is in flight, further calls do not issue new
  /// requests; they get a handle to the same pending result. The fetcher is
  /// remembered so `invalidate` can refetch without it.
  pub fn ensure<F, Fut>(&mut self, key: K, fetcher: F) -> Pending<V>
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchResult<V>> + Send + 'static,
  {
    let stale_time = self.stale_time;
    let entry = self.entries.entry(key.clone()).or_default();

    if let Some(pending) = &entry.in_flight {
      debug!(%key, "joining in-flight fetch");
      return pending.clone();
    }

    if entry.is_fresh(stale_time) {
      if let Some(data) = &entry.data {
        return future::ready(Ok(data.clone())).boxed().shared();
      }
    }

    entry.fetcher = Some(Arc::new(move || fetcher().boxed()));
    self.start_fetch(&key)
  }

  /// Mark `key` stale and refetch it with its stored fetcher.
  ///
  /// A fetch already in flight is superseded: its result will be discarded
  /// when it arrives, so the value observed next reflects any write that
  /// completed before this call. Returns whether a refetch was started.
  pub fn invalidate(&mut self, key: &K) -> bool {
    let Some(entry) = self.entries.get_mut(key) else {
      debug!(%key, "invalidate on unknown key");
      return false;
    };

    entry.invalidated = true;
    debug!(%key, "invalidated");

    if entry.fetcher.is_some() {
      let _ = self.start_fetch(key);
      true
    } else {
      self.notify(key);
      false
    }
  }

  /// Register `callback` to run whenever the entry for `key` changes value,
  /// loading state or error state.
  pub fn subscribe<F>(&mut self, key: K, callback: F) -> Subscription<K>
  where
    F: FnMut(&QueryEntry<V>) + 'static,
  {
    let id = self.next_subscription;
    self.next_subscription += 1;
    self
      .subscribers
      .entry(key.clone())
      .or_default()
      .push((id, Box::new(callback)));
    Subscription { key, id }
  }

  pub fn unsubscribe(&mut self, subscription: Subscription<K>) {
    if let Some(subs) = self.subscribers.get_mut(&subscription.key) {
      subs.retain(|(id, _)| *id != subscription.id);
      if subs.is_empty() {
        self.subscribers.remove(&subscription.key);
      }
    }
  }

  /// Apply results of completed fetches.
  ///
  /// Returns `true` if any entry changed. Call this in your event loop
  /// tick handler.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    while let Ok(completion) = self.rx.try_recv() {
      let Some(entry) = self.entries.get_mut(&completion.key) else {
        continue;
      };

      if completion.generation != entry.generation {
        debug!(key = %completion.key, generation = completion.generation, "discarding superseded fetch");
        continue;
      }

      entry.in_flight = None;
      entry.task = None;
      match completion.result {
        Ok(data) => {
          debug!(key = %completion.key, "fetch completed");
          entry.data = Some(data);
          entry.error = None;
          entry.fetched_at = Some(Instant::now());
          entry.invalidated = false;
        }
        Err(error) => {
          warn!(key = %completion.key, %error, "fetch failed");
          entry.error = Some(error);
        }
      }

      self.notify(&completion.key);
      changed = true;
    }

    changed
  }

  pub fn entry(&self, key: &K) -> Option<&QueryEntry<V>> {
    self.entries.get(key)
  }

  pub fn state(&self, key: &K) -> QueryState<'_, V> {
    self
      .entry(key)
      .map(QueryEntry::state)
      .unwrap_or(QueryState::Idle)
  }

  /// Data for `key`, including stale data retained during a refetch or
  /// after a failed one.
  pub fn data(&self, key: &K) -> Option<&V> {
    self.entries.get(key).and_then(QueryEntry::data)
  }

  /// Drop the entry for `key` and abort its fetch, if any. Subscribers stay
  /// registered and are shown an empty entry. Returns whether there was an
  /// entry.
  pub fn remove(&mut self, key: &K) -> bool {
    let Some(mut entry) = self.entries.remove(key) else {
      return false;
    };
    if let Some(task) = entry.task.take() {
      task.abort();
    }
    debug!(%key, "removed");

    let empty = QueryEntry::default();
    if let Some(subs) = self.subscribers.get_mut(key) {
      for (_, callback) in subs.iter_mut() {
        callback(&empty);
      }
    }
    true
  }

  /// Abort in-flight fetches and drop all entries and subscribers.
  pub fn shutdown(&mut self) {
    for entry in self.entries.values_mut() {
      if let Some(task) = entry.task.take() {
        task.abort();
      }
    }
    self.entries.clear();
    self.subscribers.clear();
    debug!("query cache shut down");
  }

  fn start_fetch(&mut self, key: &K) -> Pending<V> {
    let entry = self.entries.entry(key.clone()).or_default();

    let pending = match &entry.fetcher {
      Some(fetcher) => fetcher().shared(),
      None => future::ready(Err(ApiError::Network {
        message: format!("no fetcher registered for {}", key),
      }))
      .boxed()
      .shared(),
    };

    self.next_generation += 1;
    entry.generation = self.next_generation;
    entry.in_flight = Some(pending.clone());
    debug!(%key, generation = entry.generation, "fetch started");

    // The task drives the fetch to completion even if nobody awaits it
    let tx = self.tx.clone();
    let task_key = key.clone();
    let generation = entry.generation;
    let driver = pending.clone();
    entry.task = Some(tokio::spawn(async move {
      let result = driver.await;
      // Ignore send errors - the cache may have been dropped
      let _ = tx.send(Completion {
        key: task_key,
        generation,
        result,
      });
    }));

    self.notify(key);
    pending
  }

  fn notify(&mut self, key: &K) {
    let Some(entry) = self.entries.get(key) else {
      return;
    };
    if let Some(subs) = self.subscribers.get_mut(key) {
      for (_, callback) in subs.iter_mut() {
        callback(entry);
      }
    }
  }
}

impl<K, V> Drop for QueryCache<K, V> {
  fn drop(&mut self) {
    for entry in self.entries.values_mut() {
      if let Some(task) = entry.task.take() {
        task.abort();
      }
    }
  }
}
