//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    card::create_card_table, category::create_category_table,
    transaction::create_transaction_table,
    transaction_category::create_transaction_category_table,
};

/// Create the tables for cards, categories and transactions if they do not exist.
///
/// Foreign key enforcement is switched on for `connection` first, since SQLite
/// ignores the setting inside a transaction.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_card_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_transaction_category_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
