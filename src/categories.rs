//! Category registry.
//!
//! Maps a symbolic severity key (e.g. `"debug"`) to a [`Category`] holding the
//! label printed in front of each log line and a short descriptive phrase.
//!
//! ```rust,ignore
//! let mut registry = CategoryRegistry::new();
//! registry.extend_with([("checkpoint".to_string(), Category::new("Checkpoint:", "a checkpoint"))]);
//! assert_eq!(registry.resolve("debug").map(Category::label), Some("Debug:"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Built-in categories as `(key, label, phrase)`.
const BUILTIN_CATEGORIES: [(&str, &str, &str); 8] = [
    ("emergency", "Emergency:", "an emergency"),
    ("alert", "Alert:", "an alert"),
    ("critical", "Critical:", "a critical"),
    ("error", "Error:", "an error"),
    ("warning", "Warning:", "a warning"),
    ("notice", "Notice:", "a notice"),
    ("info", "Info:", "an info"),
    ("debug", "Debug:", "a debug"),
];

/// Label used for unknown-category warnings if `warning` does not resolve.
const FALLBACK_WARNING_LABEL: &str = "Warning:";

/// Display label and descriptive phrase for one category.
///
/// Serialized as a two-element sequence, e.g. `["Debug:", "a debug"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Category {
    label: String,
    phrase: String,
}

impl Category {
    pub fn new(label: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            phrase: phrase.into(),
        }
    }

    /// Prefix written before the message, e.g. `Debug:`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Article + noun phrase, e.g. `a debug`.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }
}

impl From<(String, String)> for Category {
    fn from((label, phrase): (String, String)) -> Self {
        Self { label, phrase }
    }
}

impl From<Category> for (String, String) {
    fn from(category: Category) -> Self {
        (category.label, category.phrase)
    }
}

/// Case-sensitive mapping from category key to [`Category`].
///
/// Categories are only ever reset ([`load`](Self::load)) or grown
/// ([`extend_with`](Self::extend_with)); there is no removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: BTreeMap<String, Category>,
}

impl CategoryRegistry {
    /// Creates a registry holding the built-in categories.
    pub fn new() -> Self {
        let mut registry = Self {
            categories: BTreeMap::new(),
        };
        registry.load();
        registry
    }

    /// Resets the mapping to exactly the built-in categories.
    pub fn load(&mut self) {
        self.categories = BUILTIN_CATEGORIES
            .iter()
            .map(|(key, label, phrase)| (key.to_string(), Category::new(*label, *phrase)))
            .collect();
    }

    /// Merges `additions` key by key, overwriting existing entries.
    pub fn extend_with<I>(&mut self, additions: I)
    where
        I: IntoIterator<Item = (String, Category)>,
    {
        for (key, category) in additions {
            self.categories.insert(key, category);
        }
    }

    pub fn resolve(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    /// Label to use when warning about an unknown category.
    pub fn warning_label(&self) -> &str {
        self.resolve("warning")
            .map(Category::label)
            .unwrap_or(FALLBACK_WARNING_LABEL)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<(String, Category)> for CategoryRegistry {
    fn extend<I: IntoIterator<Item = (String, Category)>>(&mut self, iter: I) {
        self.extend_with(iter);
    }
}

#[cfg(test)]
#[path = "tests/categories_tests.rs"]
mod tests;
