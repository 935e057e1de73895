//! Synthetic market data.
//!
//! [`FeedSimulator`] walks a single instrument's price inside a bounded
//! buffer of [`MarketTick`]s. [`TokenJitter`] perturbs loaded token rows and
//! [`PriceFeed`] publishes the instrument state to observers.

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::FeedConfig;
use crate::models::MarketTick;

pub mod jitter;
pub mod price;

pub use jitter::TokenJitter;
pub use price::{PriceFeed, PriceSnapshot};

pub const DEFAULT_CAPACITY: usize = 13;

/// Oldest-first FIFO of ticks with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickBuffer {
    ticks: VecDeque<MarketTick>,
    capacity: usize,
}

impl TickBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ticks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a buffer from a series, keeping only the newest `capacity` points.
    pub fn from_ticks(capacity: usize, ticks: impl IntoIterator<Item = MarketTick>) -> Self {
        let mut buffer = Self::new(capacity);
        for tick in ticks {
            buffer.push(tick);
        }
        buffer
    }

    /// Appends a tick, evicting the oldest one when full.
    pub fn push(&mut self, tick: MarketTick) {
        if self.ticks.len() == self.capacity {
            self.ticks.pop_front();
        }
        self.ticks.push_back(tick);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn oldest(&self) -> Option<&MarketTick> {
        self.ticks.front()
    }

    pub fn latest(&self) -> Option<&MarketTick> {
        self.ticks.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketTick> {
        self.ticks.iter()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.price).collect()
    }

    /// Arithmetic mean of the prices currently held, summed fresh each call.
    pub fn mean_price(&self) -> Option<f64> {
        if self.ticks.is_empty() {
            return None;
        }
        let sum: f64 = self.ticks.iter().map(|t| t.price).sum();
        Some(sum / self.ticks.len() as f64)
    }
}

/// Percent change of the latest price relative to the oldest retained one.
///
/// The denominator moves forward every time the buffer evicts, so the value is
/// a rolling-window change, not a change from a fixed origin.
pub fn percent_change(buffer: &TickBuffer) -> Option<f64> {
    let first = buffer.oldest()?.price;
    let last = buffer.latest()?.price;
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// Bounds of the instrument random walk.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalk {
    pub initial_price: f64,
    pub max_step: f64,
    pub price_floor: f64,
    pub volume_base: f64,
    pub volume_spread: f64,
    pub volume_floor: f64,
    pub decimals: Option<u32>,
}

impl Default for RandomWalk {
    fn default() -> Self {
        RandomWalk::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for RandomWalk {
    fn from(config: &FeedConfig) -> Self {
        Self {
            initial_price: config.initial_price,
            max_step: config.max_step,
            price_floor: config.price_floor,
            volume_base: config.volume_base,
            volume_spread: config.volume_spread,
            volume_floor: config.volume_floor,
            decimals: config.decimals,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedSimulator {
    walk: RandomWalk,
}

impl FeedSimulator {
    pub fn new(walk: RandomWalk) -> Self {
        Self { walk }
    }

    pub fn walk(&self) -> &RandomWalk {
        &self.walk
    }

    /// Produces the next buffer from `previous`, labelled with the local clock.
    pub fn tick<R: Rng + ?Sized>(&self, previous: &TickBuffer, rng: &mut R) -> TickBuffer {
        let label = Local::now().format("%H:%M").to_string();
        self.tick_at(previous, label, rng)
    }

    /// Same as [`tick`](Self::tick) with an explicit time label. `previous` is
    /// never modified.
    pub fn tick_at<R: Rng + ?Sized>(
        &self,
        previous: &TickBuffer,
        label: impl Into<String>,
        rng: &mut R,
    ) -> TickBuffer {
        let walk = &self.walk;
        let last_price = previous
            .latest()
            .map(|t| t.price)
            .unwrap_or(walk.initial_price);

        let step = rng.gen_range(-walk.max_step..=walk.max_step);
        let price = round_to(last_price + step, walk.decimals).max(walk.price_floor);

        let volume = (walk.volume_base + rng.gen_range(0.0..=walk.volume_spread))
            .round()
            .max(walk.volume_floor);

        let mut next = previous.clone();
        next.push(MarketTick::new(label, price, volume, 0.0));

        // Mean is taken after eviction so it always covers the retained window.
        let ma = next.mean_price().unwrap_or(price);
        if let Some(tick) = next.ticks.back_mut() {
            tick.ma = ma;
        }
        next
    }
}

fn round_to(value: f64, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(d) => {
            let factor = 10f64.powi(d as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}
