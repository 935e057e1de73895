use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{Category, SortKey, SortOrder};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub jitter: JitterConfig,
    pub fetch: FetchConfig,
    pub view: ViewConfig,
    pub logging: LoggingConfig,
}

/// Random walk of the tracked instrument.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub symbol: String,
    pub interval_ms: u64,
    pub capacity: usize,
    pub initial_price: f64,
    pub max_step: f64,
    pub price_floor: f64,
    pub volume_base: f64,
    pub volume_spread: f64,
    pub volume_floor: f64,
    pub decimals: Option<u32>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC".to_string(),
            interval_ms: 3_000,
            capacity: 13,
            initial_price: 97_234.0,
            max_step: 250.0,
            price_floor: 90_000.0,
            volume_base: 1_500.0,
            volume_spread: 1_000.0,
            volume_floor: 500.0,
            decimals: Some(2),
        }
    }
}

/// Per-token price perturbation applied to every loaded token.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct JitterConfig {
    pub interval_ms: u64,
    pub max_price_step: f64,
    pub max_change_step: f64,
    pub price_floor: f64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            max_price_step: 0.05,
            max_change_step: 1.0,
            price_floor: 0.000001,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FetchConfig {
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub failure_probability: f64,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub stale_time_secs: u64,
    pub refetch_interval_secs: u64,
    pub catalog_path: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 500,
            max_latency_ms: 1_500,
            failure_probability: 0.05,
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            stale_time_secs: 30,
            refetch_interval_secs: 60,
            catalog_path: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ViewConfig {
    pub categories: Vec<Category>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub filter_category: Option<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
            filter_category: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl FeedConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl JitterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl FetchConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn refetch_interval(&self) -> Duration {
        Duration::from_secs(self.refetch_interval_secs)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let feed = &self.feed;
        if feed.capacity == 0 {
            bail!("feed.capacity must be at least 1");
        }
        if feed.interval_ms == 0 || self.jitter.interval_ms == 0 {
            bail!("timer intervals must be non-zero");
        }
        if !(feed.max_step >= 0.0) || !(feed.volume_spread >= 0.0) {
            bail!("feed steps must be non-negative");
        }
        if !(feed.price_floor > 0.0) || !(self.jitter.price_floor > 0.0) {
            bail!("price floors must be positive");
        }
        if !(0.0..1.0).contains(&self.jitter.max_price_step) || !(self.jitter.max_change_step >= 0.0) {
            bail!("jitter.max_price_step must be in [0, 1) and max_change_step non-negative");
        }

        let fetch = &self.fetch;
        if !(0.0..=1.0).contains(&fetch.failure_probability) {
            bail!("fetch.failure_probability must be within [0, 1]");
        }
        if fetch.min_latency_ms > fetch.max_latency_ms {
            bail!("fetch.min_latency_ms exceeds fetch.max_latency_ms");
        }
        if fetch.max_attempts == 0 {
            bail!("fetch.max_attempts must be at least 1");
        }
        if fetch.base_delay_ms > fetch.max_delay_ms {
            bail!("fetch.base_delay_ms exceeds fetch.max_delay_ms");
        }
        if fetch.refetch_interval_secs == 0 {
            bail!("fetch.refetch_interval_secs must be non-zero");
        }
        Ok(())
    }
}
