//! Authoritative holder of the token partitions and the view selection.
//!
//! [`TokenState`] is the plain data with synchronous reducers. [`TokenStore`]
//! puts it behind a tokio `RwLock` so every writer is serialized, and bumps a
//! revision on a watch channel after each mutation.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::models::{Category, SortKey, SortOrder, Token};
use crate::view;

/// Sort and filter choice applied by the derived view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub filter_category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenState {
    pub new_pairs: Vec<Token>,
    pub final_stretch: Vec<Token>,
    pub migrated: Vec<Token>,
    pub all_tokens: Vec<Token>,
    pub loading: bool,
    pub error: Option<String>,
    pub selection: Selection,
}

impl TokenState {
    pub fn partition(&self, category: Category) -> &[Token] {
        match category {
            Category::New => &self.new_pairs,
            Category::Stretch => &self.final_stretch,
            Category::Migrated => &self.migrated,
            Category::All => &self.all_tokens,
        }
    }

    fn partition_mut(&mut self, category: Category) -> &mut Vec<Token> {
        match category {
            Category::New => &mut self.new_pairs,
            Category::Stretch => &mut self.final_stretch,
            Category::Migrated => &mut self.migrated,
            Category::All => &mut self.all_tokens,
        }
    }

    /// Overwrites one partition wholesale.
    pub fn replace_category(&mut self, category: Category, tokens: Vec<Token>) {
        *self.partition_mut(category) = tokens;
    }

    /// Sets price and 24h change on the token with `id` in every partition
    /// holding it. Returns how many partitions matched; zero is not an error.
    pub fn apply_price_update(&mut self, id: &str, price: f64, change_24h: f64) -> usize {
        let mut matched = 0;
        for category in Category::ALL {
            if let Some(token) = self.partition_mut(category).iter_mut().find(|t| t.id == id) {
                token.price = price;
                token.change_24h = change_24h;
                matched += 1;
            }
        }
        matched
    }

    pub fn set_sorting(&mut self, sort_by: SortKey, sort_order: SortOrder) {
        self.selection.sort_by = sort_by;
        self.selection.sort_order = sort_order;
    }

    pub fn set_filter(&mut self, filter_category: Option<String>) {
        self.selection.filter_category = filter_category;
    }

    /// Derived view of `category` under the current selection.
    pub fn view(&self, category: Category) -> Vec<Token> {
        view::project(
            self.partition(category),
            category,
            self.selection.sort_by,
            self.selection.sort_order,
            self.selection.filter_category.as_deref(),
        )
    }

    pub fn search(&self, term: &str) -> Vec<Token> {
        view::search(&self.all_tokens, term)
    }

    pub fn token_by_id(&self, id: &str) -> Option<Token> {
        view::find_by_id(
            Category::ALL.iter().map(|&c| self.partition(c)),
            id,
        )
        .cloned()
    }
}

/// Cloneable handle; all clones address the same state.
#[derive(Debug, Clone)]
pub struct TokenStore {
    state: Arc<RwLock<TokenState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    pub fn new() -> Self {
        Self::with_state(TokenState::default())
    }

    pub fn with_selection(selection: Selection) -> Self {
        Self::with_state(TokenState {
            selection,
            ..TokenState::default()
        })
    }

    pub fn with_state(state: TokenState) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(state)),
            revision: Arc::new(tx),
        }
    }

    /// Receiver that changes after every mutation. Read the store again on
    /// change rather than caching an old snapshot.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    pub async fn replace_category(&self, category: Category, tokens: Vec<Token>) {
        let count = tokens.len();
        self.state.write().await.replace_category(category, tokens);
        self.bump();
        info!("Replaced '{}' partition with {} tokens", category, count);
    }

    pub async fn apply_price_update(&self, id: &str, price: f64, change_24h: f64) -> usize {
        let matched = self
            .state
            .write()
            .await
            .apply_price_update(id, price, change_24h);
        if matched > 0 {
            self.bump();
        } else {
            debug!("Price update for unknown token id {}", id);
        }
        matched
    }

    /// Computes price updates from the current state and applies them under
    /// the same write lock, so no other writer can land in between.
    pub async fn update_prices_with<F>(&self, compute: F) -> usize
    where
        F: FnOnce(&TokenState) -> Vec<(String, f64, f64)>,
    {
        let mut applied = 0;
        {
            let mut state = self.state.write().await;
            for (id, price, change_24h) in compute(&*state) {
                if state.apply_price_update(&id, price, change_24h) > 0 {
                    applied += 1;
                }
            }
        }
        if applied > 0 {
            self.bump();
        }
        applied
    }

    pub async fn set_sorting(&self, sort_by: SortKey, sort_order: SortOrder) {
        self.state.write().await.set_sorting(sort_by, sort_order);
        self.bump();
    }

    pub async fn set_filter(&self, filter_category: Option<String>) {
        self.state.write().await.set_filter(filter_category);
        self.bump();
    }

    pub async fn set_loading(&self, loading: bool) {
        self.state.write().await.loading = loading;
        self.bump();
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.state.write().await.error = error;
        self.bump();
    }

    pub async fn snapshot(&self) -> TokenState {
        self.state.read().await.clone()
    }

    pub async fn partition(&self, category: Category) -> Vec<Token> {
        self.state.read().await.partition(category).to_vec()
    }

    pub async fn selection(&self) -> Selection {
        self.state.read().await.selection.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn view(&self, category: Category) -> Vec<Token> {
        self.state.read().await.view(category)
    }

    pub async fn search(&self, term: &str) -> Vec<Token> {
        self.state.read().await.search(term)
    }

    pub async fn token_by_id(&self, id: &str) -> Option<Token> {
        self.state.read().await.token_by_id(id)
    }
}
