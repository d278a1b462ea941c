//! Defines the core data models and database table for card transactions.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    card::CardId,
    category::{Category, CategoryId},
    database_id::DatabaseId,
    store::{Persist, StoreEvent},
    transaction_category::{get_transaction_categories, link_categories},
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

// ============================================================================
// MODELS
// ============================================================================

/// A purchase made with a card.
///
/// Transactions cannot be edited once saved, only deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct CardTransaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The card the purchase was made with.
    ///
    /// This may refer to a card that has since been deleted.
    pub card_id: CardId,
    /// What was bought, or where.
    pub name: String,
    /// How much was spent.
    pub amount: f64,
    /// The day of the purchase.
    pub date: Date,
    /// Whether a receipt photo is stored for the transaction.
    ///
    /// The photo itself is loaded with [get_transaction_photo](crate::get_transaction_photo).
    pub has_photo: bool,
    /// The categories the transaction is tagged with, newest category first.
    pub categories: Vec<Category>,
}

/// The unsaved state of a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// The card the purchase was made with. Must refer to an existing card.
    pub card_id: CardId,
    /// What was bought, or where.
    pub name: String,
    /// How much was spent.
    pub amount: f64,
    /// The day of the purchase.
    pub date: Date,
    /// A normalized JPEG of the receipt.
    pub photo: Option<Vec<u8>>,
    /// The categories to tag the transaction with. Each must refer to an existing category.
    pub categories: Vec<CategoryId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns read by [map_transaction_row], in order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, card_id, name, amount, date, photo IS NOT NULL";

impl Persist for TransactionDraft {
    type Saved = CardTransaction;

    /// Insert the transaction and its category links.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCard] if the card does not exist,
    /// - [Error::InvalidCategory] if one of the categories does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn persist(self, connection: &Connection) -> Result<(CardTransaction, StoreEvent), Error> {
        if !row_exists("card", self.card_id, connection)? {
            return Err(Error::InvalidCard(self.card_id));
        }

        let mut category_ids = self.categories;
        category_ids.sort_unstable();
        category_ids.dedup();

        for &category_id in &category_ids {
            if !row_exists("category", category_id, connection)? {
                return Err(Error::InvalidCategory(category_id));
            }
        }

        let mut transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (card_id, name, amount, date, photo)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (self.card_id, &self.name, self.amount, self.date, &self.photo),
                map_transaction_row,
            )?;

        link_categories(transaction.id, &category_ids, connection)?;
        transaction.categories = get_transaction_categories(transaction.id, connection)?;

        let event = StoreEvent::TransactionSaved(transaction.id);

        Ok((transaction, event))
    }
}

fn row_exists(table: &str, id: DatabaseId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
            [id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Create the transaction table.
///
/// `card_id` is not a foreign key: what happens to the transactions of a
/// deleted card is decided by the store's referential policy.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            card_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            photo BLOB
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_card_date ON \"transaction\"(card_id, date);",
    )?;

    Ok(())
}

/// Map a row selected with [TRANSACTION_COLUMNS] to a [CardTransaction] without categories.
pub fn map_transaction_row(row: &Row) -> Result<CardTransaction, rusqlite::Error> {
    Ok(CardTransaction {
        id: row.get(0)?,
        card_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        has_photo: row.get(5)?,
        categories: Vec::new(),
    })
}

#[cfg(test)]
mod persist_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        card::{CardDraft, CardId, CardType, Expiry},
        category::{CategoryDraft, CategoryId, CategoryName},
        color::Color,
        db::initialize,
        query::get_transaction_photo,
        store::{Persist, StoreEvent},
        transaction::TransactionDraft,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn create_card(connection: &Connection) -> CardId {
        CardDraft {
            id: None,
            name: "Visa Gold".to_owned(),
            number: "4111".to_owned(),
            card_type: CardType::Visa,
            limit: 5000,
            expiry: Expiry::new(12, 2030).unwrap(),
            color: Color::BLUE,
        }
        .persist(connection)
        .unwrap()
        .0
        .id
    }

    fn create_category(name: &str, connection: &Connection) -> CategoryId {
        CategoryDraft::new(CategoryName::new_unchecked(name), Color::RED)
            .persist(connection)
            .unwrap()
            .0
            .id
    }

    fn draft(card_id: CardId, categories: Vec<CategoryId>) -> TransactionDraft {
        TransactionDraft {
            card_id,
            name: "Store".to_owned(),
            amount: 42.5,
            date: date!(2025 - 03 - 14),
            photo: None,
            categories,
        }
    }

    #[test]
    fn insert_returns_transaction_with_categories() {
        let connection = get_test_connection();
        let card_id = create_card(&connection);
        let groceries = create_category("Groceries", &connection);

        let (transaction, event) = draft(card_id, vec![groceries])
            .persist(&connection)
            .unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.card_id, card_id);
        assert_eq!(transaction.name, "Store");
        assert_eq!(transaction.amount, 42.5);
        assert_eq!(transaction.date, date!(2025 - 03 - 14));
        assert!(!transaction.has_photo);
        assert_eq!(transaction.categories.len(), 1);
        assert_eq!(transaction.categories[0].id, groceries);
        assert_eq!(event, StoreEvent::TransactionSaved(1));
    }

    #[test]
    fn duplicate_categories_are_linked_once() {
        let connection = get_test_connection();
        let card_id = create_card(&connection);
        let groceries = create_category("Groceries", &connection);

        let (transaction, _) = draft(card_id, vec![groceries, groceries])
            .persist(&connection)
            .unwrap();

        assert_eq!(transaction.categories.len(), 1);
    }

    #[test]
    fn stores_photo() {
        let connection = get_test_connection();
        let card_id = create_card(&connection);
        let photo = vec![0xff, 0xd8, 0xff, 0xe0];

        let (transaction, _) = TransactionDraft {
            photo: Some(photo.clone()),
            ..draft(card_id, vec![])
        }
        .persist(&connection)
        .unwrap();

        assert!(transaction.has_photo);
        assert_eq!(
            get_transaction_photo(transaction.id, &connection),
            Ok(Some(photo))
        );
    }

    #[test]
    fn fails_on_missing_card() {
        let connection = get_test_connection();

        let result = draft(99, vec![]).persist(&connection);

        assert_eq!(result, Err(Error::InvalidCard(99)));
    }

    #[test]
    fn fails_on_missing_category() {
        let connection = get_test_connection();
        let card_id = create_card(&connection);
        let groceries = create_category("Groceries", &connection);

        let result = draft(card_id, vec![groceries, 1234]).persist(&connection);

        assert_eq!(result, Err(Error::InvalidCategory(1234)));
    }

    #[test]
    fn accepts_any_amount() {
        let connection = get_test_connection();
        let card_id = create_card(&connection);

        for amount in [0.0, -12.34, 1e9] {
            let (transaction, _) = TransactionDraft {
                amount,
                ..draft(card_id, vec![])
            }
            .persist(&connection)
            .unwrap();

            assert_eq!(transaction.amount, amount);
        }
    }
}
