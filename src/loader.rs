//! Cached, reactive loading of option lists
//!
//! [`OptionsLoader`] resolves a locator into a list of selectable options
//! through a shared TTL cache, fetching from the upstream client only when
//! the cache has nothing fresh. Each consumer takes an
//! [`OptionsSubscription`] and re-invokes [`OptionsSubscription::load`]
//! whenever the inputs that determine its locator change; a newer call
//! supersedes any fetch still in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::cache::{self, OptionsCache};
use crate::client::OptionsClient;
use crate::extract::extract_items;

/// Fixed message surfaced to subscribers when a fetch fails. The raw cause
/// goes to the log only.
pub const LOAD_ERROR: &str = "Failed to load options";

/// Tuning for a loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum age for which a cached entry is served without a refetch.
    /// Zero disables caching.
    pub cache_ttl: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl LoaderConfig {
    /// Always refetch, never serve from cache.
    pub fn no_cache() -> Self {
        Self {
            cache_ttl: Duration::ZERO,
        }
    }
}

/// The `{value, label}` shape most select widgets consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    pub value: String,
    pub label: String,
}

impl OptionRecord {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One subscriber's view of its option list.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsState<T> {
    /// Transformed options, in upstream order.
    pub options: Vec<T>,
    /// True exactly while a fetch for the current locator is in flight.
    pub loading: bool,
    /// Non-empty iff the most recent fetch attempt failed.
    pub error: String,
}

impl<T> Default for OptionsState<T> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            loading: false,
            error: String::new(),
        }
    }
}

/// Loads option lists from an upstream client through a shared TTL cache.
///
/// Cloning is cheap; clones share the client, cache, and config, so two
/// independent subscribers asking for the same locator within the TTL
/// window pay for a single network fetch between them.
#[derive(Clone)]
pub struct OptionsLoader {
    client: Arc<dyn OptionsClient>,
    cache: OptionsCache,
    config: LoaderConfig,
}

impl OptionsLoader {
    /// Loader over the process-wide shared cache.
    pub fn new(client: Arc<dyn OptionsClient>) -> Self {
        Self {
            client,
            cache: cache::shared(),
            config: LoaderConfig::default(),
        }
    }

    /// Loader over a caller-owned cache, for test isolation or scoped
    /// lifetimes.
    pub fn with_cache(client: Arc<dyn OptionsClient>, cache: OptionsCache) -> Self {
        Self {
            client,
            cache,
            config: LoaderConfig::default(),
        }
    }

    /// Replace the default config.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &OptionsCache {
        &self.cache
    }

    /// Drop the cached entry for `locator`; the next load refetches.
    pub fn invalidate(&self, locator: &str) {
        self.cache.invalidate(locator);
    }

    /// One-shot, cache-aware fetch of the raw items for `locator`.
    ///
    /// For consumers that read their options once rather than subscribing.
    /// An empty locator yields an empty list without touching the cache or
    /// the network.
    pub async fn fetch(&self, locator: &str) -> Result<Arc<Vec<Value>>> {
        if locator.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }
        if let Some(items) = self.cache.fresh(locator, self.config.cache_ttl) {
            debug!("options cache hit for {locator}");
            return Ok(items);
        }
        let body = self.client.get(locator).await?;
        Ok(self.cache.insert(locator, extract_items(&body)))
    }

    /// Create a subscription whose options are `transform` applied to each
    /// raw item. The transform must not rely on being called exactly once
    /// per item; cache hits re-run it over the cached snapshot.
    pub fn subscribe<T, F>(&self, transform: F) -> OptionsSubscription<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&Value) -> T + Send + Sync + 'static,
    {
        OptionsSubscription::new(self.clone(), Arc::new(transform))
    }

    /// Create a subscription exposing the raw items untransformed.
    pub fn subscribe_raw(&self) -> OptionsSubscription<Value> {
        self.subscribe(Value::clone)
    }
}

struct SubscriptionInner<T> {
    loader: OptionsLoader,
    transform: Arc<dyn Fn(&Value) -> T + Send + Sync>,
    state: watch::Sender<OptionsState<T>>,
    /// Bumped on every `load` call and on drop. A fetch result is applied
    /// only if the generation it captured is still current at resolution
    /// time, so a stale slow response never overwrites a newer one.
    generation: AtomicU64,
}

/// One caller's live subscription to a loader.
///
/// Dropping the subscription neuters any fetch still in flight; the
/// underlying request is not aborted, its result is simply discarded.
pub struct OptionsSubscription<T> {
    inner: Arc<SubscriptionInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> OptionsSubscription<T> {
    fn new(loader: OptionsLoader, transform: Arc<dyn Fn(&Value) -> T + Send + Sync>) -> Self {
        let (state, _) = watch::channel(OptionsState::default());
        Self {
            inner: Arc::new(SubscriptionInner {
                loader,
                transform,
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Receiver for state changes. Await `changed()` and read `borrow()`.
    pub fn state(&self) -> watch::Receiver<OptionsState<T>> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> OptionsState<T> {
        self.inner.state.borrow().clone()
    }

    /// (Re-)evaluate the option list for `locator`.
    ///
    /// An absent or empty locator resolves immediately to an empty list
    /// with no cache or network interaction. A fresh cache entry resolves
    /// synchronously without a fetch. Otherwise the state goes loading and
    /// a background fetch fills the cache and the state on resolution.
    ///
    /// On fetch failure the cache and the previously loaded options are
    /// left untouched; subscribers see [`LOAD_ERROR`] in `error` and the
    /// raw cause is logged. Nothing is retried automatically.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&self, locator: Option<&str>) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let locator = match locator {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => {
                self.inner.state.send_replace(OptionsState::default());
                return;
            }
        };

        let inner = &self.inner;
        let ttl = inner.loader.config.cache_ttl;
        if let Some(items) = inner.loader.cache.fresh(&locator, ttl) {
            debug!("options cache hit for {locator}");
            let options = items.iter().map(|item| (inner.transform)(item)).collect();
            inner.state.send_replace(OptionsState {
                options,
                loading: false,
                error: String::new(),
            });
            return;
        }

        inner.state.send_modify(|state| {
            state.loading = true;
            state.error.clear();
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = inner.loader.client.get(&locator).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                debug!("discarding stale options response for {locator}");
                return;
            }
            match result {
                Ok(body) => {
                    let items = inner.loader.cache.insert(&locator, extract_items(&body));
                    let options = items.iter().map(|item| (inner.transform)(item)).collect();
                    inner.state.send_replace(OptionsState {
                        options,
                        loading: false,
                        error: String::new(),
                    });
                }
                Err(err) => {
                    warn!("failed to load options from {locator}: {err:#}");
                    inner.state.send_modify(|state| {
                        state.loading = false;
                        state.error = LOAD_ERROR.to_string();
                    });
                }
            }
        });
    }
}

impl<T> Drop for OptionsSubscription<T> {
    fn drop(&mut self) {
        // Outdate any fetch still in flight so it cannot touch the state.
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
    }
}
