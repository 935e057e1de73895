use crate::config::{Config, FetchConfig};
use crate::models::{Category, Token};

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

pub fn create_test_token(id: &str, symbol: &str, price: f64, market_cap: f64) -> Token {
    Token::new(id, format!("{} Token", symbol), symbol, price, 0.0, market_cap, market_cap / 10.0)
}

/// The same token listed in `new` and `all`, plus one token unique to each.
pub fn overlapping_partitions() -> Vec<(Category, Vec<Token>)> {
    let shared = create_test_token("shared", "SHR", 1.5, 3.0e6);
    vec![
        (
            Category::New,
            vec![shared.clone(), create_test_token("fresh", "FRS", 0.02, 9.0e5)],
        ),
        (
            Category::All,
            vec![
                create_test_token("big", "BIG", 42.0, 1.0e9).with_rank(1).with_category("layer1"),
                shared.with_rank(2).with_category("meme"),
            ],
        ),
    ]
}
