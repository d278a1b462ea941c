//! Card transactions: purchases made with a card.
//!
//! This module contains the `CardTransaction` model, its database table and
//! the handlers for adding, listing and deleting purchases.

mod core;
mod create;
mod delete;
mod list;
mod receipt;

pub(crate) use core::TRANSACTION_COLUMNS;
pub use core::{
    CardTransaction, TransactionDraft, TransactionId, create_transaction_table, map_transaction_row,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use list::transaction_list_view;
pub use receipt::get_transaction_photo_endpoint;
