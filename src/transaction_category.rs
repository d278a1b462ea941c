//! Links between transactions and the categories they are tagged with.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    Error,
    card::CardId,
    category::{Category, CategoryId, map_category_row_with_offset},
    transaction::TransactionId,
};

/// Create the junction table between transactions and categories.
///
/// Links are removed with their transaction. Links to a deleted category are
/// handled by the store's referential policy, so `category_id` is not a
/// foreign key.
pub fn create_transaction_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transaction_category (
            transaction_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(transaction_id, category_id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_category_category_id
            ON transaction_category(category_id);",
    )?;

    Ok(())
}

/// Tag a transaction with each of `category_ids`.
pub fn link_categories(
    transaction_id: TransactionId,
    category_ids: &[CategoryId],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO transaction_category (transaction_id, category_id) VALUES (?1, ?2)",
    )?;

    for category_id in category_ids {
        statement.execute((transaction_id, category_id))?;
    }

    Ok(())
}

/// Get the IDs of the transactions tagged with `category_id`.
pub fn get_linked_transaction_ids(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Vec<TransactionId>, Error> {
    connection
        .prepare(
            "SELECT transaction_id FROM transaction_category
             WHERE category_id = ?1 ORDER BY transaction_id",
        )?
        .query_map([category_id], |row| row.get(0))?
        .map(|maybe_id| maybe_id.map_err(Error::from))
        .collect()
}

/// Remove every link to `category_id`.
pub fn unlink_category(category_id: CategoryId, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM transaction_category WHERE category_id = ?1",
            [category_id],
        )
        .map_err(Error::from)
}

/// Get the categories of a single transaction, newest category first.
///
/// Links to categories that no longer exist are skipped.
pub fn get_transaction_categories(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT c.id, c.name, c.color, c.timestamp
             FROM transaction_category tc
             INNER JOIN category c ON c.id = tc.category_id
             WHERE tc.transaction_id = ?1
             ORDER BY c.timestamp DESC, c.id DESC",
        )?
        .query_map([transaction_id], |row| map_category_row_with_offset(row, 0))?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Get the categories of every transaction on a card, grouped by transaction.
///
/// Each list is ordered newest category first. Transactions without
/// categories are absent from the map.
pub fn get_card_transaction_categories(
    card_id: CardId,
    connection: &Connection,
) -> Result<HashMap<TransactionId, Vec<Category>>, Error> {
    let mut categories_per_transaction: HashMap<TransactionId, Vec<Category>> = HashMap::new();

    let mut statement = connection.prepare(
        "SELECT tc.transaction_id, c.id, c.name, c.color, c.timestamp
         FROM transaction_category tc
         INNER JOIN category c ON c.id = tc.category_id
         INNER JOIN \"transaction\" t ON t.id = tc.transaction_id
         WHERE t.card_id = ?1
         ORDER BY c.timestamp DESC, c.id DESC",
    )?;
    let rows = statement.query_map([card_id], |row| {
        let transaction_id: TransactionId = row.get(0)?;
        let category = map_category_row_with_offset(row, 1)?;

        Ok((transaction_id, category))
    })?;

    for row in rows {
        let (transaction_id, category) = row?;
        categories_per_transaction
            .entry(transaction_id)
            .or_default()
            .push(category);
    }

    Ok(categories_per_transaction)
}

/// Count how many transactions are tagged with each category.
pub fn count_transactions_per_category(
    connection: &Connection,
) -> Result<HashMap<CategoryId, usize>, Error> {
    connection
        .prepare("SELECT category_id, COUNT(1) FROM transaction_category GROUP BY category_id")?
        .query_map((), |row| {
            let category_id = row.get(0)?;
            let count: i64 = row.get(1)?;

            Ok((category_id, count as usize))
        })?
        .map(|maybe_count| maybe_count.map_err(Error::from))
        .collect()
}
