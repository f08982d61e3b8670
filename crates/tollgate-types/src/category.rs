//! Data categories and their storage-table mapping.

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic category of the data being operated on.
///
/// The category doubles as the storage classification: every category
/// maps to exactly one table via [`Category::table`], and that mapping
/// is the *only* way a `table` value ever enters an envelope. A
/// caller-supplied table name is never consulted — the data router
/// recomputes it from the item type before the category-scoped
/// entitlement check.
///
/// # Example
///
/// ```
/// use tollgate_types::Category;
///
/// let cat = Category::parse("Animals").unwrap();
/// assert_eq!(cat, Category::Animals);
/// assert_eq!(cat.table(), "table1");
///
/// assert!(Category::parse("minerals").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Animal records, stored in `table1`.
    Animals,
    /// Plant records, stored in `table2`.
    Plants,
}

impl Category {
    /// Parses an item type string case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedCategory`] for any input outside the fixed set,
    /// carrying the original spelling for the error envelope.
    pub fn parse(item_type: &str) -> Result<Self, UnmappedCategory> {
        match item_type.trim().to_ascii_lowercase().as_str() {
            "animals" => Ok(Self::Animals),
            "plants" => Ok(Self::Plants),
            _ => Err(UnmappedCategory(item_type.to_string())),
        }
    }

    /// Returns the semantic name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Animals => "animals",
            Self::Plants => "plants",
        }
    }

    /// Returns the storage table this category persists to.
    ///
    /// Total and explicit: adding a category without a table arm is a
    /// compile error, so the mapping can never silently be partial.
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            Self::Animals => "table1",
            Self::Plants => "table2",
        }
    }

    /// All categories, for policy iteration.
    #[must_use]
    pub fn all() -> [Category; 2] {
        [Self::Animals, Self::Plants]
    }

    /// Looks a category up by its storage table name.
    #[must_use]
    pub fn from_table(table: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.table() == table)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An item type with no storage mapping.
///
/// Detected by the data router before the category-scoped entitlement
/// check; the request is answered with a structured error and never
/// forwarded further.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no storage mapping for item type '{0}'")]
pub struct UnmappedCategory(pub String);

impl ErrorCode for UnmappedCategory {
    fn code(&self) -> &'static str {
        "TYPE_UNMAPPED_CATEGORY"
    }

    fn is_recoverable(&self) -> bool {
        // The item type will not map on retry; the caller must fix it.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_error_code;

    #[test]
    fn every_category_has_a_distinct_table() {
        let tables: Vec<_> = Category::all().iter().map(|c| c.table()).collect();
        assert_eq!(tables, vec!["table1", "table2"]);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Category::parse("ANIMALS").unwrap(), Category::Animals);
        assert_eq!(Category::parse(" plants ").unwrap(), Category::Plants);
    }

    #[test]
    fn parse_rejects_unmapped_input() {
        let err = Category::parse("minerals").unwrap_err();
        assert_eq!(err.0, "minerals");
        assert_error_code(&err, "TYPE_");
    }

    #[test]
    fn table_round_trip() {
        for cat in Category::all() {
            assert_eq!(Category::from_table(cat.table()), Some(cat));
        }
        assert_eq!(Category::from_table("table9"), None);
    }
}
