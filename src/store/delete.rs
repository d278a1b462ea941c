//! Deletes entities and applies the referential policy to whatever refers to them.

use rusqlite::Connection;

use crate::{
    Error,
    card::CardId,
    category::CategoryId,
    store::{CardDeletion, CategoryDeletion, StoreEvent},
    transaction::TransactionId,
    transaction_category::{get_linked_transaction_ids, unlink_category},
};

/// Delete a card, then orphan, delete or protect its transactions according to `policy`.
///
/// Returns the events for every deleted entity.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCard] if the card does not exist,
/// - [Error::DeleteRestricted] if `policy` is [CardDeletion::Restrict] and the card has transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub(super) fn delete_card(
    card_id: CardId,
    policy: CardDeletion,
    connection: &Connection,
) -> Result<Vec<StoreEvent>, Error> {
    let rows_affected = connection.execute("DELETE FROM card WHERE id = ?1", [card_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCard);
    }

    let mut events = vec![StoreEvent::CardDeleted(card_id)];
    let transaction_ids = get_card_transaction_ids(card_id, connection)?;

    match policy {
        CardDeletion::Orphan => {
            if !transaction_ids.is_empty() {
                tracing::info!(
                    "Card {card_id} was deleted, {} transaction(s) no longer belong to a card",
                    transaction_ids.len()
                );
            }
        }
        CardDeletion::Cascade => {
            events.extend(delete_transactions(&transaction_ids, connection)?);
        }
        CardDeletion::Restrict => {
            if !transaction_ids.is_empty() {
                return Err(Error::DeleteRestricted {
                    entity: "card",
                    references: transaction_ids.len(),
                });
            }
        }
    }

    Ok(events)
}

/// Delete a category, then detach, keep, delete or protect the transactions
/// tagged with it according to `policy`.
///
/// Returns the events for every deleted entity.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if the category does not exist,
/// - [Error::DeleteRestricted] if `policy` is [CategoryDeletion::Restrict] and the category is in use,
/// - or [Error::SqlError] if there is some other SQL error.
pub(super) fn delete_category(
    category_id: CategoryId,
    policy: CategoryDeletion,
    connection: &Connection,
) -> Result<Vec<StoreEvent>, Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    let mut events = vec![StoreEvent::CategoryDeleted(category_id)];
    let transaction_ids = get_linked_transaction_ids(category_id, connection)?;

    match policy {
        CategoryDeletion::Detach => {
            unlink_category(category_id, connection)?;
        }
        CategoryDeletion::Orphan => {
            if !transaction_ids.is_empty() {
                tracing::info!(
                    "Category {category_id} was deleted, {} transaction(s) still refer to it",
                    transaction_ids.len()
                );
            }
        }
        CategoryDeletion::Cascade => {
            events.extend(delete_transactions(&transaction_ids, connection)?);
        }
        CategoryDeletion::Restrict => {
            if !transaction_ids.is_empty() {
                return Err(Error::DeleteRestricted {
                    entity: "category",
                    references: transaction_ids.len(),
                });
            }
        }
    }

    Ok(events)
}

/// Delete a transaction and its category links.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if the transaction does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub(super) fn delete_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Vec<StoreEvent>, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1",
        [transaction_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(vec![StoreEvent::TransactionDeleted(transaction_id)])
}

fn delete_transactions(
    transaction_ids: &[TransactionId],
    connection: &Connection,
) -> Result<Vec<StoreEvent>, Error> {
    let mut statement = connection.prepare("DELETE FROM \"transaction\" WHERE id = ?1")?;

    transaction_ids
        .iter()
        .map(|&transaction_id| -> Result<StoreEvent, Error> {
            statement.execute([transaction_id])?;
            Ok(StoreEvent::TransactionDeleted(transaction_id))
        })
        .collect()
}

fn get_card_transaction_ids(
    card_id: CardId,
    connection: &Connection,
) -> Result<Vec<TransactionId>, Error> {
    connection
        .prepare("SELECT id FROM \"transaction\" WHERE card_id = ?1 ORDER BY id")?
        .query_map([card_id], |row| row.get(0))?
        .map(|maybe_id| maybe_id.map_err(Error::from))
        .collect()
}
