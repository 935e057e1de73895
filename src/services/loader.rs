use log::{error, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{RetryPolicy, TokenSource};
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::metrics;
use crate::models::{Category, Token};
use crate::store::TokenStore;
use crate::utils::Cache;
use crate::validation;

/// Fetches category batches into the store, with retries, validation and a
/// short-lived cache of the last good batch per category.
///
/// Every fetch runs in its own task. Dropping the future returned by
/// [`CategoryLoader::refresh`] stops the wait, not the load: the store still
/// receives the outcome and the loading flag is still cleared.
pub struct CategoryLoader {
    inner: Arc<LoaderState>,
}

struct LoaderState {
    store: TokenStore,
    source: Arc<dyn TokenSource>,
    retry: RetryPolicy,
    cache: Cache<Category, Vec<Token>>,
    in_flight: AtomicUsize,
}

impl CategoryLoader {
    pub fn new(
        store: TokenStore,
        source: Arc<dyn TokenSource>,
        retry: RetryPolicy,
        stale_time: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderState {
                store,
                source,
                retry,
                cache: Cache::new(stale_time),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn from_config(store: TokenStore, source: Arc<dyn TokenSource>, config: &FetchConfig) -> Self {
        Self::new(store, source, RetryPolicy::from(config), config.stale_time())
    }

    pub fn store(&self) -> &TokenStore {
        &self.inner.store
    }

    /// Loads `category` unless a batch younger than the stale time is cached,
    /// in which case the store is left as is. Returns the batch size.
    pub async fn load(&self, category: Category) -> Result<usize> {
        if let Some(cached) = self.inner.cache.get(&category).await {
            info!("Serving '{}' from cache ({} tokens)", category, cached.len());
            return Ok(cached.len());
        }
        self.refresh(category).await
    }

    /// Always fetches. On failure the error message lands in the store and
    /// the partition keeps its previous contents.
    pub async fn refresh(&self, category: Category) -> Result<usize> {
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.refresh(category).await })
            .await
            .map_err(|e| Error::InternalError(format!("Load task for '{}' failed: {}", category, e)))?
    }
}

impl LoaderState {
    async fn refresh(&self, category: Category) -> Result<usize> {
        self.begin().await;
        let result = self.fetch_validated(category).await;
        let outcome = match result {
            Ok(tokens) => {
                let count = tokens.len();
                if tokens.is_empty() {
                    warn!("Fetched an empty '{}' batch, keeping current partition", category);
                } else {
                    self.cache.set(category, tokens.clone()).await;
                    self.store.replace_category(category, tokens).await;
                }
                self.store.set_error(None).await;
                Ok(count)
            }
            Err(e) => {
                error!("Loading '{}' failed: {}", category, e);
                self.store.set_error(Some(e.user_message())).await;
                Err(e)
            }
        };
        self.end().await;
        outcome
    }

    async fn fetch_validated(&self, category: Category) -> Result<Vec<Token>> {
        let source = &self.source;
        let label = format!("fetch '{}'", category);
        let result = self
            .retry
            .run(&label, |_| async move {
                metrics::FETCH_ATTEMPTS.inc();
                let result = source.fetch_tokens(category).await;
                if result.is_err() {
                    metrics::FETCH_FAILURES.inc();
                }
                result
            })
            .await;
        if let Err(Error::RetriesExhausted { .. }) = &result {
            metrics::FETCH_EXHAUSTED.inc();
        }
        let tokens = result?;
        validation::validate_batch(&tokens)?;
        Ok(tokens)
    }

    // Loads for different categories overlap; the flag stays up until the
    // last one finishes.
    async fn begin(&self) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.store.set_loading(true).await;
        }
    }

    async fn end(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.store.set_loading(false).await;
        }
    }
}
