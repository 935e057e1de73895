use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::Token;

pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(Error::ValidationError("Symbol cannot be empty".to_string()));
    }
    if !symbol.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(Error::ValidationError(format!(
            "Symbol must contain only uppercase letters and digits: {}",
            symbol
        )));
    }
    Ok(())
}

fn non_negative(value: f64, field: &str, id: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::ValidationError(format!(
            "Invalid {} for token {}: {}",
            field, id, value
        )));
    }
    Ok(())
}

pub fn validate_token(token: &Token) -> Result<()> {
    if token.id.trim().is_empty() {
        return Err(Error::ValidationError("Empty token ID".to_string()));
    }
    if token.name.trim().is_empty() {
        return Err(Error::ValidationError(format!("Empty name for token {}", token.id)));
    }
    validate_symbol(&token.symbol)?;

    non_negative(token.price, "price", &token.id)?;
    non_negative(token.market_cap, "market cap", &token.id)?;
    non_negative(token.volume_24h, "volume", &token.id)?;
    if let Some(liquidity) = token.liquidity {
        non_negative(liquidity, "liquidity", &token.id)?;
    }
    if !token.change_24h.is_finite() {
        return Err(Error::ValidationError(format!(
            "Invalid 24h change for token {}: {}",
            token.id, token.change_24h
        )));
    }
    if token.rank == Some(0) {
        return Err(Error::ValidationError(format!("Rank must be positive for token {}", token.id)));
    }
    Ok(())
}

/// Checks every row and that identifiers are unique within the batch.
pub fn validate_batch(tokens: &[Token]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tokens.len());
    for token in tokens {
        validate_token(token)?;
        if !seen.insert(token.id.as_str()) {
            return Err(Error::ValidationError(format!("Duplicate token ID: {}", token.id)));
        }
    }
    Ok(())
}
