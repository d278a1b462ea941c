//! Notifications published after the store commits a change.

use std::fmt::Display;

use crate::{card::CardId, category::CategoryId, transaction::TransactionId};

/// The number of events a slow subscriber may fall behind by before it
/// starts missing events.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A committed change to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    /// A card was created or updated.
    CardSaved(CardId),
    /// A card was deleted.
    CardDeleted(CardId),
    /// A transaction was created.
    TransactionSaved(TransactionId),
    /// A transaction was deleted.
    TransactionDeleted(TransactionId),
    /// A category was created or updated.
    CategorySaved(CategoryId),
    /// A category was deleted.
    CategoryDeleted(CategoryId),
}

impl Display for StoreEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreEvent::CardSaved(id) => write!(f, "card-saved:{id}"),
            StoreEvent::CardDeleted(id) => write!(f, "card-deleted:{id}"),
            StoreEvent::TransactionSaved(id) => write!(f, "transaction-saved:{id}"),
            StoreEvent::TransactionDeleted(id) => write!(f, "transaction-deleted:{id}"),
            StoreEvent::CategorySaved(id) => write!(f, "category-saved:{id}"),
            StoreEvent::CategoryDeleted(id) => write!(f, "category-deleted:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoreEvent;

    #[test]
    fn display_names_entity_and_id() {
        assert_eq!(StoreEvent::CardSaved(3).to_string(), "card-saved:3");
        assert_eq!(
            StoreEvent::TransactionDeleted(12).to_string(),
            "transaction-deleted:12"
        );
        assert_eq!(StoreEvent::CategorySaved(1).to_string(), "category-saved:1");
    }
}
