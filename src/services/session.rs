use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::TokenSource;
use crate::config::Config;
use crate::feed::{PriceFeed, TokenJitter};
use crate::metrics;
use crate::models::Category;
use crate::services::{CategoryLoader, PeriodicTask};
use crate::store::TokenStore;

/// One jitter pass over whatever the store holds right now. Each distinct id
/// is stepped once, from its first occurrence, and the result is written to
/// every partition holding it. Reads and writes happen under one lock.
pub async fn jitter_once<R: Rng + ?Sized>(store: &TokenStore, jitter: &TokenJitter, rng: &mut R) -> usize {
    let applied = store
        .update_prices_with(|state| {
            let mut seen = HashSet::new();
            let mut updates = Vec::new();
            for category in Category::ALL {
                for token in state.partition(category) {
                    if seen.insert(token.id.as_str()) {
                        let next = jitter.next(token, rng);
                        updates.push((token.id.clone(), next.price, next.change_24h));
                    }
                }
            }
            updates
        })
        .await;
    metrics::TOKEN_PRICE_UPDATES.inc_by(applied as f64);
    debug!("Jittered {} tokens", applied);
    applied
}

/// The running simulation: instrument ticks, token jitter and per-category
/// refreshes, each on its own timer.
pub struct FeedSession {
    store: TokenStore,
    feed: Arc<PriceFeed>,
    loader: Arc<CategoryLoader>,
    ticks: PeriodicTask,
    jitter: PeriodicTask,
    refresh: Vec<(Category, PeriodicTask)>,
}

impl FeedSession {
    pub fn start(
        config: &Config,
        store: TokenStore,
        feed: Arc<PriceFeed>,
        source: Arc<dyn TokenSource>,
        categories: &[Category],
    ) -> Self {
        Self::spawn(
            config,
            store,
            feed,
            source,
            categories,
            StdRng::from_entropy(),
            StdRng::from_entropy(),
        )
    }

    /// Same as [`FeedSession::start`] with reproducible random walks.
    pub fn start_seeded(
        config: &Config,
        store: TokenStore,
        feed: Arc<PriceFeed>,
        source: Arc<dyn TokenSource>,
        categories: &[Category],
        seed: u64,
    ) -> Self {
        Self::spawn(
            config,
            store,
            feed,
            source,
            categories,
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        )
    }

    fn spawn(
        config: &Config,
        store: TokenStore,
        feed: Arc<PriceFeed>,
        source: Arc<dyn TokenSource>,
        categories: &[Category],
        mut tick_rng: StdRng,
        jitter_rng: StdRng,
    ) -> Self {
        feed.set_connection_status(true);

        let tick_feed = feed.clone();
        let ticks = PeriodicTask::spawn("instrument tick", config.feed.interval(), move || {
            tick_feed.advance(&mut tick_rng);
            future::ready(())
        });

        let jitter_store = store.clone();
        let token_jitter = Arc::new(TokenJitter::from(&config.jitter));
        let jitter_rng = Arc::new(Mutex::new(jitter_rng));
        let jitter = PeriodicTask::spawn("token jitter", config.jitter.interval(), move || {
            let store = jitter_store.clone();
            let token_jitter = token_jitter.clone();
            let rng = jitter_rng.clone();
            async move {
                let mut rng = rng.lock().await;
                jitter_once(&store, &token_jitter, &mut *rng).await;
            }
        });

        let loader = Arc::new(CategoryLoader::from_config(store.clone(), source, &config.fetch));
        let mut watched: Vec<Category> = Vec::new();
        for &category in categories {
            if !watched.contains(&category) {
                watched.push(category);
            }
        }
        let refresh = watched
            .into_iter()
            .map(|category| {
                let task = Self::refresh_task(&loader, category, config);
                (category, task)
            })
            .collect();

        info!(
            "Feed session started: ticks every {}ms, jitter every {}ms, refresh every {}s",
            config.feed.interval_ms, config.jitter.interval_ms, config.fetch.refetch_interval_secs
        );

        Self {
            store,
            feed,
            loader,
            ticks,
            jitter,
            refresh,
        }
    }

    // First firing is immediate and may be served from cache; later ones
    // always refetch. Cancelling the timer leaves an in-flight load to finish.
    fn refresh_task(loader: &Arc<CategoryLoader>, category: Category, config: &Config) -> PeriodicTask {
        let loader = loader.clone();
        let mut initial = true;
        PeriodicTask::spawn_now(
            format!("refresh {}", category),
            config.fetch.refetch_interval(),
            move || {
                let loader = loader.clone();
                let first = std::mem::replace(&mut initial, false);
                async move {
                    let result = if first {
                        loader.load(category).await
                    } else {
                        loader.refresh(category).await
                    };
                    if let Ok(count) = result {
                        debug!("Refreshed '{}' with {} tokens", category, count);
                    }
                }
            },
        )
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn feed(&self) -> &Arc<PriceFeed> {
        &self.feed
    }

    pub fn loader(&self) -> &Arc<CategoryLoader> {
        &self.loader
    }

    pub fn categories(&self) -> Vec<Category> {
        self.refresh.iter().map(|(c, _)| *c).collect()
    }

    pub fn cancel_ticks(&self) {
        self.ticks.cancel();
    }

    pub fn cancel_jitter(&self) {
        self.jitter.cancel();
    }

    /// Returns false if `category` was not being refreshed.
    pub fn cancel_refresh(&self, category: Category) -> bool {
        match self.refresh.iter().find(|(c, _)| *c == category) {
            Some((_, task)) => {
                task.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticks.is_running()
    }

    pub fn is_jittering(&self) -> bool {
        self.jitter.is_running()
    }

    pub fn shutdown(&self) {
        self.ticks.cancel();
        self.jitter.cancel();
        for (_, task) in &self.refresh {
            task.cancel();
        }
        self.feed.set_connection_status(false);
        info!("Feed session stopped");
    }
}
