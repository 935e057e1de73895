use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Category, Token};

pub mod catalog;
pub mod simulated;
pub mod retry;

pub use catalog::Catalog;
pub use simulated::SimulatedTokenSource;
pub use retry::RetryPolicy;

/// Where category batches come from. [`SimulatedTokenSource`] is the only
/// implementation shipped.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_tokens(&self, category: Category) -> Result<Vec<Token>>;
}
