use rand::Rng;

use crate::config::JitterConfig;
use crate::models::Token;

/// Next price and 24h change for one token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceUpdate {
    pub price: f64,
    pub change_24h: f64,
}

/// Multiplicative price step plus an additive drift of the 24h change.
///
/// The 24h change accumulates across applications, so its value after several
/// firings depends on how many were applied.
#[derive(Debug, Clone)]
pub struct TokenJitter {
    max_price_step: f64,
    max_change_step: f64,
    price_floor: f64,
}

impl Default for TokenJitter {
    fn default() -> Self {
        TokenJitter::from(&JitterConfig::default())
    }
}

impl From<&JitterConfig> for TokenJitter {
    fn from(config: &JitterConfig) -> Self {
        Self {
            max_price_step: config.max_price_step,
            max_change_step: config.max_change_step,
            price_floor: config.price_floor,
        }
    }
}

impl TokenJitter {
    pub fn next<R: Rng + ?Sized>(&self, token: &Token, rng: &mut R) -> PriceUpdate {
        let factor = 1.0 + rng.gen_range(-self.max_price_step..=self.max_price_step);
        let drift = rng.gen_range(-self.max_change_step..=self.max_change_step);

        PriceUpdate {
            price: (token.price * factor).max(self.price_floor),
            change_24h: token.change_24h + drift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_step_bounds() {
        let jitter = TokenJitter::default();
        let token = Token::new("1", "SolanaAI", "SOLAI", 0.0234, 156.7, 2.34e6, 8.9e5);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..1_000 {
            let update = jitter.next(&token, &mut rng);
            assert!(update.price >= token.price * 0.95 - 1e-12);
            assert!(update.price <= token.price * 1.05 + 1e-12);
            assert!((update.change_24h - token.change_24h).abs() <= 1.0);
        }
    }

    #[test]
    fn test_price_never_drops_below_floor() {
        let jitter = TokenJitter::default();
        let mut token = Token::new("33", "Bonk", "BONK", 0.000001, -15.67, 1.89e9, 2.34e8);
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..200 {
            let update = jitter.next(&token, &mut rng);
            assert!(update.price >= 0.000001);
            token.price = update.price;
            token.change_24h = update.change_24h;
        }
    }

    #[test]
    fn test_zero_steps_leave_values_unchanged() {
        let jitter = TokenJitter::from(&JitterConfig {
            max_price_step: 0.0,
            max_change_step: 0.0,
            ..JitterConfig::default()
        });
        let token = Token::new("2", "DeFiMax", "DMAX", 1.23, -12.4, 1.23e7, 2.34e6);
        let mut rng = StdRng::seed_from_u64(0);

        let update = jitter.next(&token, &mut rng);
        assert_eq!(update.price, 1.23);
        assert_eq!(update.change_24h, -12.4);
    }
}
