use chrono::{DateTime, Utc};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::watch;

use crate::config::FeedConfig;
use crate::feed::{percent_change, FeedSimulator, RandomWalk, TickBuffer};
use crate::metrics;
use crate::models::MarketTick;

const SEED_PRICE_CHANGE: f64 = 2.45;
const SEED_ANCHOR_PRICE: f64 = 97_234.0;

// Half-hourly series the dashboard opens with, anchored at SEED_ANCHOR_PRICE.
const SEED_SERIES: [(&str, f64, f64, f64); 13] = [
    ("09:00", 94_800.0, 1_200.0, 94_950.0),
    ("09:30", 95_200.0, 1_450.0, 95_000.0),
    ("10:00", 94_950.0, 980.0, 95_050.0),
    ("10:30", 95_800.0, 1_680.0, 95_100.0),
    ("11:00", 96_200.0, 2_100.0, 95_200.0),
    ("11:30", 95_900.0, 1_750.0, 95_300.0),
    ("12:00", 96_800.0, 2_300.0, 95_450.0),
    ("12:30", 97_100.0, 1_950.0, 95_600.0),
    ("13:00", 96_750.0, 1_600.0, 95_750.0),
    ("13:30", 97_400.0, 2_450.0, 95_900.0),
    ("14:00", 97_650.0, 2_200.0, 96_100.0),
    ("14:30", 97_200.0, 1_800.0, 96_300.0),
    ("15:00", 97_234.0, 1_950.0, 96_500.0),
];

/// Published state of the tracked instrument. Observers receive whole
/// replacements, never a shared mutable reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub ticks: TickBuffer,
    pub current_price: f64,
    pub price_change: f64,
    pub is_connected: bool,
    pub last_update: DateTime<Utc>,
    pub history: HashMap<String, Vec<MarketTick>>,
}

pub struct PriceFeed {
    simulator: FeedSimulator,
    initial: PriceSnapshot,
    tx: watch::Sender<PriceSnapshot>,
}

impl PriceFeed {
    pub fn new(simulator: FeedSimulator, initial: PriceSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            simulator,
            initial,
            tx,
        }
    }

    /// Feed for `config`, opening with the seeded series rescaled to
    /// `initial_price`.
    pub fn from_config(config: &FeedConfig) -> Self {
        let scale = config.initial_price / SEED_ANCHOR_PRICE;
        let ticks = TickBuffer::from_ticks(
            config.capacity,
            SEED_SERIES
                .iter()
                .map(|&(time, price, volume, ma)| MarketTick::new(time, price * scale, volume, ma * scale)),
        );
        let initial = PriceSnapshot {
            symbol: config.symbol.clone(),
            current_price: ticks.latest().map(|t| t.price).unwrap_or(config.initial_price),
            ticks,
            price_change: SEED_PRICE_CHANGE,
            is_connected: true,
            last_update: Utc::now(),
            history: HashMap::new(),
        };
        Self::new(FeedSimulator::new(RandomWalk::from(config)), initial)
    }

    pub fn subscribe(&self) -> watch::Receiver<PriceSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        self.tx.borrow().clone()
    }

    /// Runs one simulator step against the current buffer and publishes the result.
    pub fn advance<R: Rng + ?Sized>(&self, rng: &mut R) -> PriceSnapshot {
        self.replace_ticks(|simulator, ticks| simulator.tick(ticks, rng))
    }

    pub fn advance_at<R: Rng + ?Sized>(&self, label: &str, rng: &mut R) -> PriceSnapshot {
        self.replace_ticks(|simulator, ticks| simulator.tick_at(ticks, label, rng))
    }

    fn replace_ticks<F>(&self, step: F) -> PriceSnapshot
    where
        F: FnOnce(&FeedSimulator, &TickBuffer) -> TickBuffer,
    {
        let simulator = &self.simulator;
        self.tx.send_modify(|state| {
            let ticks = step(simulator, &state.ticks);
            if let Some(latest) = ticks.latest() {
                state.current_price = latest.price;
            }
            // Keep the previous change when the window can't produce one.
            if let Some(change) = percent_change(&ticks) {
                state.price_change = change;
            }
            state.ticks = ticks;
            state.last_update = Utc::now();
        });

        let snapshot = self.snapshot();
        metrics::TICKS_GENERATED.inc();
        metrics::INSTRUMENT_PRICE.set(snapshot.current_price);
        debug!(
            "{} tick: price {:.2}, change {:.3}%, window {}",
            snapshot.symbol,
            snapshot.current_price,
            snapshot.price_change,
            snapshot.ticks.len()
        );
        snapshot
    }

    pub fn set_connection_status(&self, connected: bool) {
        self.tx.send_modify(|state| state.is_connected = connected);
    }

    pub fn set_price_history(&self, symbol: impl Into<String>, ticks: Vec<MarketTick>) {
        let symbol = symbol.into();
        self.tx.send_modify(|state| {
            state.history.insert(symbol, ticks);
        });
    }

    pub fn price_history(&self, symbol: &str) -> Option<Vec<MarketTick>> {
        self.tx.borrow().history.get(symbol).cloned()
    }

    /// Restores the opening series and clears per-symbol history.
    pub fn reset(&self) {
        let mut initial = self.initial.clone();
        initial.last_update = Utc::now();
        initial.history.clear();
        self.tx.send_modify(|state| {
            let connected = state.is_connected;
            *state = initial;
            state.is_connected = connected;
        });
    }
}
