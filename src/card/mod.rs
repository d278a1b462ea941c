//! Credit cards: the data model, the pages for viewing, creating and editing
//! cards, and the endpoint for deleting them.

mod card_page;
mod cards_page;
mod core;
mod create;
mod delete;
mod edit;
mod form;

pub use card_page::get_card_page;
pub use cards_page::get_cards_page;
pub(crate) use core::{CARD_COLUMNS, map_card_row};
pub use core::{Card, CardDraft, CardId, CardType, Expiry, create_card_table};
pub use create::{create_card_endpoint, get_new_card_page};
pub use delete::delete_card_endpoint;
pub use edit::{edit_card_endpoint, get_edit_card_page};
