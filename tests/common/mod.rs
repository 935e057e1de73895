#![allow(dead_code)]

use std::sync::Arc;

use token_pulse::api::{Catalog, SimulatedTokenSource};
use token_pulse::config::{Config, FetchConfig};
use token_pulse::models::{Category, Token};
use token_pulse::store::TokenStore;

/// Default config with fetch failures switched off.
pub fn create_test_config() -> Config {
    Config {
        fetch: FetchConfig {
            failure_probability: 0.0,
            ..FetchConfig::default()
        },
        ..Config::default()
    }
}

pub fn create_test_token(id: &str, name: &str, price: f64, market_cap: f64) -> Token {
    Token::new(id, name, name.to_uppercase(), price, 0.0, market_cap, market_cap / 20.0)
}

/// The built-in `all` partition: caps of 115.2B, 1.2B, 0.89B, 2.34B, 0.89B.
pub fn all_tokens() -> Vec<Token> {
    Catalog::builtin().expect("built-in catalog").all
}

pub fn seeded_source(failure_probability: f64, seed: u64) -> Arc<SimulatedTokenSource> {
    let config = FetchConfig {
        failure_probability,
        ..FetchConfig::default()
    };
    Arc::new(
        SimulatedTokenSource::from_config(&config)
            .expect("built-in catalog")
            .with_seed(seed),
    )
}

pub async fn loaded_store() -> TokenStore {
    let catalog = Catalog::builtin().expect("built-in catalog");
    let store = TokenStore::new();
    for category in Category::ALL {
        store.replace_category(category, catalog.get(category).to_vec()).await;
    }
    store
}
