use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub mod market;

pub use market::{MarketTick, Token};

/// The four token partitions held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    New,
    #[serde(alias = "near-migration")]
    Stretch,
    Migrated,
    All,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::New,
        Category::Stretch,
        Category::Migrated,
        Category::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::New => "new",
            Category::Stretch => "stretch",
            Category::Migrated => "migrated",
            Category::All => "all",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Category::New),
            "stretch" | "near-migration" => Ok(Category::Stretch),
            "migrated" => Ok(Category::Migrated),
            "all" => Ok(Category::All),
            other => Err(Error::ParseError(format!("Unknown category: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "change24h")]
    Change24h,
    #[default]
    #[serde(rename = "marketCap")]
    MarketCap,
    #[serde(rename = "volume24h")]
    Volume24h,
    #[serde(rename = "name")]
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Price => "price",
            SortKey::Change24h => "change24h",
            SortKey::MarketCap => "marketCap",
            SortKey::Volume24h => "volume24h",
            SortKey::Name => "name",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortKey::Price),
            "change24h" => Ok(SortKey::Change24h),
            "marketCap" => Ok(SortKey::MarketCap),
            "volume24h" => Ok(SortKey::Volume24h),
            "name" => Ok(SortKey::Name),
            other => Err(Error::ParseError(format!("Unknown sort key: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::ParseError(format!("Unknown sort order: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("new".parse::<Category>().unwrap(), Category::New);
        assert_eq!("stretch".parse::<Category>().unwrap(), Category::Stretch);
        assert_eq!("near-migration".parse::<Category>().unwrap(), Category::Stretch);
        assert!("trending".parse::<Category>().is_err());
        assert!("New".parse::<Category>().is_err());

        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(serde_json::to_string(&Category::Stretch).unwrap(), "\"stretch\"");
        let parsed: Category = serde_json::from_str("\"near-migration\"").unwrap();
        assert_eq!(parsed, Category::Stretch);
    }

    #[test]
    fn test_sort_key_wire_names() {
        assert_eq!(serde_json::to_string(&SortKey::MarketCap).unwrap(), "\"marketCap\"");
        assert_eq!("volume24h".parse::<SortKey>().unwrap(), SortKey::Volume24h);
        assert!("market_cap".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_selection_defaults() {
        assert_eq!(SortKey::default(), SortKey::MarketCap);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
