use serde::{Deserialize, Serialize};

use crate::models::SortKey;

/// One token row. Identity fields (`id`, `name`, `symbol`) never change after
/// load; the price feed only touches `price` and `change_24h`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl Token {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        price: f64,
        change_24h: f64,
        market_cap: f64,
        volume_24h: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            price,
            change_24h,
            market_cap,
            volume_24h,
            liquidity: None,
            category: None,
            rank: None,
        }
    }

    pub fn with_liquidity(mut self, liquidity: f64) -> Self {
        self.liquidity = Some(liquidity);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Numeric value for a sort key, `None` for `SortKey::Name`.
    pub fn numeric_field(&self, key: SortKey) -> Option<f64> {
        match key {
            SortKey::Price => Some(self.price),
            SortKey::Change24h => Some(self.change_24h),
            SortKey::MarketCap => Some(self.market_cap),
            SortKey::Volume24h => Some(self.volume_24h),
            SortKey::Name => None,
        }
    }
}

/// A single simulated observation of the tracked instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    pub time: String,
    pub price: f64,
    pub volume: f64,
    /// Mean price over the tick buffer this tick was appended to.
    pub ma: f64,
}

impl MarketTick {
    pub fn new(time: impl Into<String>, price: f64, volume: f64, ma: f64) -> Self {
        Self {
            time: time.into(),
            price,
            volume,
            ma,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_wire_format() {
        let token = Token::new("31", "Solana", "SOL", 245.67, 12.34, 115.2e9, 2.4e9)
            .with_liquidity(1.2e9);
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["change24h"], 12.34);
        assert_eq!(json["marketCap"], 115.2e9);
        assert_eq!(json["volume24h"], 2.4e9);
        assert!(json.get("rank").is_none());
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_token_optional_fields_default() {
        let json = r#"{"id":"all-1","name":"Solana","symbol":"SOL","price":245.67,
            "change24h":12.34,"marketCap":1.0,"volume24h":2.0,"rank":1,"category":"Layer 1"}"#;
        let token: Token = serde_json::from_str(json).unwrap();

        assert_eq!(token.rank, Some(1));
        assert_eq!(token.category.as_deref(), Some("Layer 1"));
        assert_eq!(token.liquidity, None);
    }

    #[test]
    fn test_numeric_field() {
        let token = Token::new("1", "A", "A", 1.0, -2.0, 3.0, 4.0);
        assert_eq!(token.numeric_field(SortKey::Price), Some(1.0));
        assert_eq!(token.numeric_field(SortKey::Change24h), Some(-2.0));
        assert_eq!(token.numeric_field(SortKey::MarketCap), Some(3.0));
        assert_eq!(token.numeric_field(SortKey::Volume24h), Some(4.0));
        assert_eq!(token.numeric_field(SortKey::Name), None);
    }
}
