//! Displayed inventory list: search filter plus sort order
//!
//! The projection never touches the synchronizer's list; it builds a fresh
//! vector every time one of its inputs changes.

use serde::{Deserialize, Serialize};
use shelf_common::{InventoryItem, SortKey};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Search text and sort order chosen by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub sort_key: SortKey,
}

impl ViewState {
    pub fn new(search_query: impl Into<String>, sort_key: SortKey) -> Self {
        Self {
            search_query: search_query.into(),
            sort_key,
        }
    }

    pub fn project(&self, items: &[InventoryItem]) -> Vec<InventoryItem> {
        project(items, &self.search_query, self.sort_key)
    }
}

/// Filter `items` by a case-insensitive substring of the name, then
/// stable-sort them by `sort_key`
pub fn project(items: &[InventoryItem], search_query: &str, sort_key: SortKey) -> Vec<InventoryItem> {
    let query = search_query.to_lowercase();
    let mut shown: Vec<InventoryItem> = items
        .iter()
        .filter(|item| query.is_empty() || item.name.to_lowercase().contains(&query))
        .cloned()
        .collect();

    match sort_key {
        SortKey::NameAsc => shown.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::NameDesc => shown.sort_by(|a, b| compare_names(&b.name, &a.name)),
        SortKey::QuantityAsc => shown.sort_by(|a, b| a.quantity.cmp(&b.quantity)),
        SortKey::QuantityDesc => shown.sort_by(|a, b| b.quantity.cmp(&a.quantity)),
    }
    shown
}

/// Locale-style name ordering.
///
/// Three levels, each consulted only when the previous one ties: base
/// letters ignoring case and accents, then accents, then case with lowercase
/// first. Names still equal fall back to code point order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| {
            a.nfd()
                .filter(|c| !is_combining_mark(*c))
                .map(char::is_uppercase)
                .cmp(b.nfd().filter(|c| !is_combining_mark(*c)).map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Decomposed and lowercased, accents kept as combining marks
fn folded(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    folded(name).filter(|c| !is_combining_mark(*c))
}
