use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Registry, TextEncoder};

use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref TICKS_GENERATED: Counter = Counter::new(
        "feed_ticks_total",
        "Total number of simulated instrument ticks"
    ).unwrap();

    pub static ref TOKEN_PRICE_UPDATES: Counter = Counter::new(
        "token_price_updates_total",
        "Total number of per-token price updates applied to the store"
    ).unwrap();

    pub static ref FETCH_ATTEMPTS: Counter = Counter::new(
        "token_fetch_attempts_total",
        "Total number of category fetch attempts"
    ).unwrap();

    pub static ref FETCH_FAILURES: Counter = Counter::new(
        "token_fetch_failures_total",
        "Total number of failed category fetch attempts"
    ).unwrap();

    pub static ref FETCH_EXHAUSTED: Counter = Counter::new(
        "token_fetch_exhausted_total",
        "Total number of category loads that ran out of retries"
    ).unwrap();

    pub static ref INSTRUMENT_PRICE: Gauge = Gauge::new(
        "instrument_price",
        "Latest simulated instrument price"
    ).unwrap();
}

pub fn init() -> Result<()> {
    REGISTRY.register(Box::new(TICKS_GENERATED.clone()))?;
    REGISTRY.register(Box::new(TOKEN_PRICE_UPDATES.clone()))?;
    REGISTRY.register(Box::new(FETCH_ATTEMPTS.clone()))?;
    REGISTRY.register(Box::new(FETCH_FAILURES.clone()))?;
    REGISTRY.register(Box::new(FETCH_EXHAUSTED.clone()))?;
    REGISTRY.register(Box::new(INSTRUMENT_PRICE.clone()))?;
    Ok(())
}

/// Text exposition of every registered metric.
pub fn render() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| crate::error::Error::InternalError(e.to_string()))
}
