//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, color::Color, database_id::DatabaseId};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or just whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// A user defined label for transactions, e.g. "Groceries".
///
/// Names do not have to be unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category.
    pub name: CategoryName,
    /// The color of the category's badge.
    pub color: Color,
    /// When the category was created.
    pub created_at: OffsetDateTime,
}

/// The unsaved state of a category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    /// The category to update, or `None` to create a new category.
    pub id: Option<CategoryId>,
    /// The name of the category.
    pub name: CategoryName,
    /// The color of the category's badge.
    pub color: Color,
}

impl CategoryDraft {
    /// A draft for a new category.
    pub fn new(name: CategoryName, color: Color) -> Self {
        Self {
            id: None,
            name,
            color,
        }
    }
}

/// Form data for category creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    /// The category name.
    pub name: String,
    /// The color as `#rrggbb`.
    pub color: String,
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let name = CategoryName::new("");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let name = CategoryName::new("\n\t \r");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = CategoryName::new("  Groceries ").unwrap();

        assert_eq!(name.as_ref(), "Groceries");
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let name = CategoryName::new("🛒");

        assert!(name.is_ok())
    }
}
