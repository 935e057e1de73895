use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::{Category, Token};
use crate::validation;

const BUILTIN: &str = include_str!("catalog.json");

/// Token batches served by the mock source, one list per partition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub new: Vec<Token>,
    #[serde(default, alias = "near-migration")]
    pub stretch: Vec<Token>,
    #[serde(default)]
    pub migrated: Vec<Token>,
    #[serde(default)]
    pub all: Vec<Token>,
}

impl Catalog {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        for category in Category::ALL {
            validation::validate_batch(catalog.get(category))?;
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, category: Category) -> &[Token] {
        match category {
            Category::New => &self.new,
            Category::Stretch => &self.stretch,
            Category::Migrated => &self.migrated,
            Category::All => &self.all,
        }
    }
}
