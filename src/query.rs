//! Sorted and filtered reads from the store.
//!
//! Every function returns a snapshot: the values do not change when the store
//! is modified later, so pages re-query after each change.

use std::collections::HashSet;

use rusqlite::{Connection, OptionalExtension};

use crate::{
    Error,
    card::{CARD_COLUMNS, Card, CardId, map_card_row},
    category::{CATEGORY_COLUMNS, Category, CategoryId, map_category_row},
    transaction::{CardTransaction, TRANSACTION_COLUMNS, TransactionId, map_transaction_row},
    transaction_category::{get_card_transaction_categories, get_transaction_categories},
};

/// The direction to sort by time in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Get all cards sorted by when they were created.
///
/// Cards created at the same time are sorted by ID in the same direction.
pub fn list_cards(connection: &Connection, order: SortOrder) -> Result<Vec<Card>, Error> {
    let order = order.as_sql();

    connection
        .prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM card ORDER BY timestamp {order}, id {order}"
        ))?
        .query_map([], map_card_row)?
        .map(|maybe_card| maybe_card.map_err(Error::from))
        .collect()
}

/// Get all categories sorted by when they were created.
pub fn list_categories(connection: &Connection, order: SortOrder) -> Result<Vec<Category>, Error> {
    let order = order.as_sql();

    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category ORDER BY timestamp {order}, id {order}"
        ))?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Retrieve a card by its ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `card_id` does not refer to a card,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_card(card_id: CardId, connection: &Connection) -> Result<Card, Error> {
    connection
        .prepare(&format!("SELECT {CARD_COLUMNS} FROM card WHERE id = :id"))?
        .query_row(&[(":id", &card_id)], map_card_row)
        .map_err(Error::from)
}

/// Retrieve a category by its ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `category_id` does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = :id"
        ))?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(Error::from)
}

/// Retrieve a transaction and its categories by the transaction's ID.
///
/// Transactions whose card has been deleted can still be retrieved.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `transaction_id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<CardTransaction, Error> {
    let mut transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &transaction_id)], map_transaction_row)?;

    transaction.categories = get_transaction_categories(transaction_id, connection)?;

    Ok(transaction)
}

/// Retrieve the receipt photo of a transaction, if it has one.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `transaction_id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction_photo(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Option<Vec<u8>>, Error> {
    connection
        .query_row(
            "SELECT photo FROM \"transaction\" WHERE id = ?1",
            [transaction_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::NotFound)
}

/// Selects a card's transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// The card the transactions were made with.
    pub card_id: CardId,
    /// Only keep transactions tagged with at least one of these categories.
    ///
    /// An empty set keeps every transaction.
    pub categories: HashSet<CategoryId>,
    /// The direction to sort purchase dates in.
    pub order: SortOrder,
}

impl TransactionQuery {
    /// Select every transaction of `card_id`, newest first.
    pub fn for_card(card_id: CardId) -> Self {
        Self {
            card_id,
            ..Default::default()
        }
    }

    /// Only keep transactions tagged with at least one of `categories`.
    pub fn with_categories(mut self, categories: HashSet<CategoryId>) -> Self {
        self.categories = categories;
        self
    }
}

/// Get the transactions selected by `query`, sorted by purchase date.
///
/// Transactions on the same day are sorted by ID in the same direction.
/// Transactions of a deleted card are never returned since they no longer
/// belong to a card.
pub fn fetch_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<CardTransaction>, Error> {
    let order = query.order.as_sql();
    let columns = TRANSACTION_COLUMNS
        .split(", ")
        .map(|column| format!("t.{column}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut transactions = connection
        .prepare(&format!(
            "SELECT {columns} FROM \"transaction\" t
             INNER JOIN card c ON c.id = t.card_id
             WHERE t.card_id = :card_id
             ORDER BY t.date {order}, t.id {order}"
        ))?
        .query_map(&[(":card_id", &query.card_id)], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut categories = get_card_transaction_categories(query.card_id, connection)?;

    for transaction in &mut transactions {
        transaction.categories = categories.remove(&transaction.id).unwrap_or_default();
    }

    Ok(filter_by_categories(transactions, &query.categories))
}

/// Keep the transactions tagged with at least one of the `selected` categories.
///
/// If `selected` is empty, `transactions` is returned unchanged.
pub fn filter_by_categories(
    transactions: Vec<CardTransaction>,
    selected: &HashSet<CategoryId>,
) -> Vec<CardTransaction> {
    if selected.is_empty() {
        return transactions;
    }

    transactions
        .into_iter()
        .filter(|transaction| {
            transaction
                .categories
                .iter()
                .any(|category| selected.contains(&category.id))
        })
        .collect()
}

/// The sum of the amounts of `transactions`.
pub fn purchase_total(transactions: &[CardTransaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// The sum of the amounts of every transaction made with a card.
///
/// This is the amount spent, it is not related to the card's credit limit.
pub fn card_purchase_total(card_id: CardId, connection: &Connection) -> Result<f64, Error> {
    let total = connection.query_row(
        "SELECT COALESCE(SUM(t.amount), 0.0) FROM \"transaction\" t
         INNER JOIN card c ON c.id = t.card_id
         WHERE t.card_id = ?1",
        [card_id],
        |row| row.get(0),
    )?;

    Ok(total)
}
