//! What happens to transactions when the card or category they refer to is deleted.

use std::{fmt::Display, str::FromStr};

use crate::Error;

/// The rule applied to a card's transactions when the card is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardDeletion {
    /// Keep the transactions. They can still be fetched by ID but are no
    /// longer listed under any card.
    #[default]
    Orphan,
    /// Delete the transactions together with the card.
    Cascade,
    /// Refuse to delete a card that still has transactions.
    Restrict,
}

/// The rule applied to tagged transactions when a category is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryDeletion {
    /// Remove the category from the transactions and keep the transactions.
    #[default]
    Detach,
    /// Keep the links to the deleted category. They are skipped when
    /// transactions are read.
    Orphan,
    /// Delete every transaction tagged with the category.
    Cascade,
    /// Refuse to delete a category that is still in use.
    Restrict,
}

/// The deletion rule for each relationship in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferentialPolicy {
    /// Applied when a card is deleted.
    pub card: CardDeletion,
    /// Applied when a category is deleted.
    pub category: CategoryDeletion,
}

impl CardDeletion {
    fn as_str(&self) -> &'static str {
        match self {
            CardDeletion::Orphan => "orphan",
            CardDeletion::Cascade => "cascade",
            CardDeletion::Restrict => "restrict",
        }
    }
}

impl FromStr for CardDeletion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" => Ok(CardDeletion::Orphan),
            "cascade" => Ok(CardDeletion::Cascade),
            "restrict" => Ok(CardDeletion::Restrict),
            _ => Err(Error::InvalidPolicy(s.to_owned())),
        }
    }
}

impl Display for CardDeletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CategoryDeletion {
    fn as_str(&self) -> &'static str {
        match self {
            CategoryDeletion::Detach => "detach",
            CategoryDeletion::Orphan => "orphan",
            CategoryDeletion::Cascade => "cascade",
            CategoryDeletion::Restrict => "restrict",
        }
    }
}

impl FromStr for CategoryDeletion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detach" => Ok(CategoryDeletion::Detach),
            "orphan" => Ok(CategoryDeletion::Orphan),
            "cascade" => Ok(CategoryDeletion::Cascade),
            "restrict" => Ok(CategoryDeletion::Restrict),
            _ => Err(Error::InvalidPolicy(s.to_owned())),
        }
    }
}

impl Display for CategoryDeletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
