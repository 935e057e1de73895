use async_trait::async_trait;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::api::{Catalog, TokenSource};
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::models::{Category, Token};

/// Serves catalog batches after a random delay and fails now and then.
#[derive(Debug)]
pub struct SimulatedTokenSource {
    catalog: Catalog,
    min_latency: Duration,
    max_latency: Duration,
    failure_probability: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedTokenSource {
    pub fn new(catalog: Catalog, config: &FetchConfig) -> Self {
        Self {
            catalog,
            min_latency: Duration::from_millis(config.min_latency_ms),
            max_latency: Duration::from_millis(config.max_latency_ms.max(config.min_latency_ms)),
            failure_probability: config.failure_probability.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Built-in catalog, or the JSON file named by `catalog_path`.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };
        Ok(Self::new(catalog, config))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_failure_probability(mut self, probability: f64) -> Self {
        self.failure_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait]
impl TokenSource for SimulatedTokenSource {
    async fn fetch_tokens(&self, category: Category) -> Result<Vec<Token>> {
        let (delay, fails) = {
            let mut rng = self.rng.lock().await;
            let delay = rng.gen_range(self.min_latency..=self.max_latency);
            (delay, rng.gen_bool(self.failure_probability))
        };

        tokio::time::sleep(delay).await;

        if fails {
            warn!("Simulated fetch for '{}' failed after {}ms", category, delay.as_millis());
            return Err(Error::FetchFailed(category));
        }

        let tokens = self.catalog.get(category).to_vec();
        debug!("Fetched {} '{}' tokens in {}ms", tokens.len(), category, delay.as_millis());
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(failure_probability: f64) -> SimulatedTokenSource {
        let config = FetchConfig {
            failure_probability,
            ..FetchConfig::default()
        };
        SimulatedTokenSource::from_config(&config).unwrap().with_seed(17)
    }

    #[tokio::test(start_paused = true)]
    async fn test_serves_catalog_after_latency() {
        let source = source(0.0);
        let started = tokio::time::Instant::now();

        let tokens = source.fetch_tokens(Category::Migrated).await.unwrap();

        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(500));
        assert!(waited <= Duration::from_millis(1_500));
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].symbol, "SOL");
    }

    #[tokio::test(start_paused = true)]
    async fn test_certain_failure() {
        let source = source(1.0);
        match source.fetch_tokens(Category::All).await {
            Err(Error::FetchFailed(Category::All)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
