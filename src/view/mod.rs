//! Derived views over token partitions. Nothing here mutates its input.

use std::cmp::Ordering;

use crate::models::{Category, SortKey, SortOrder, Token};

/// Filtered and sorted copy of `tokens`.
///
/// The category filter only applies to the `all` partition and matches the
/// token's `category` exactly. Sorting is stable, so tokens with equal keys
/// keep their input order in both directions.
pub fn project(
    tokens: &[Token],
    partition: Category,
    sort_by: SortKey,
    sort_order: SortOrder,
    filter_category: Option<&str>,
) -> Vec<Token> {
    let mut retained: Vec<Token> = match (filter_category, partition) {
        (Some(filter), Category::All) => tokens
            .iter()
            .filter(|t| t.category.as_deref() == Some(filter))
            .cloned()
            .collect(),
        _ => tokens.to_vec(),
    };

    retained.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    retained
}

fn compare(a: &Token, b: &Token, key: SortKey) -> Ordering {
    match (a.numeric_field(key), b.numeric_field(key)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

/// Tokens whose name or symbol contains `term`, ignoring case. A blank term
/// matches nothing.
pub fn search(tokens: &[Token], term: &str) -> Vec<Token> {
    if term.trim().is_empty() {
        return Vec::new();
    }
    let term = term.to_lowercase();
    tokens
        .iter()
        .filter(|t| t.name.to_lowercase().contains(&term) || t.symbol.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// First token with `id`, scanning partitions in the order given.
pub fn find_by_id<'a, I>(partitions: I, id: &str) -> Option<&'a Token>
where
    I: IntoIterator<Item = &'a [Token]>,
{
    partitions
        .into_iter()
        .flat_map(|tokens| tokens.iter())
        .find(|t| t.id == id)
}
