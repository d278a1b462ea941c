//! Money Tracker is a local web app for keeping track of credit card purchases.
//!
//! Cards, purchase transactions and the categories used to tag them live in a
//! local SQLite database behind a single [Store]. The pages are rendered on the
//! server and served on the loopback interface.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod card;
mod category;
mod color;
mod database_id;
mod db;
mod endpoints;
mod events;
mod form_input;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod photo;
mod query;
mod routing;
mod store;
mod timezone;
mod transaction;
mod transaction_category;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use card::{Card, CardDraft, CardId, CardType, Expiry};
pub use category::{Category, CategoryDraft, CategoryId, CategoryName};
pub use color::Color;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use photo::{RECEIPT_PHOTO_SIZE, TargetSize, normalize as normalize_photo};
pub use query::{
    SortOrder, TransactionQuery, card_purchase_total, fetch_transactions, filter_by_categories,
    get_card, get_category, get_transaction, get_transaction_photo, list_cards, list_categories,
    purchase_total,
};
pub use routing::build_router;
pub use store::{
    CardDeletion, CategoryDeletion, EntityRef, ReferentialPolicy, Store, StoreEvent, UnitOfWork,
};
pub use timezone::get_local_offset;
pub use transaction::{CardTransaction, TransactionDraft, TransactionId};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// Wait for ctrl+c or, on unix, the terminate signal, then give the server
/// behind `handle` one second to finish in-flight requests.
///
/// A signal handler that cannot be installed is logged and never fires.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal_name = tokio::select! {
        _ = ctrl_c => "ctrl+c",
        _ = terminate => "terminate",
    };

    tracing::info!("Received {signal_name} signal, shutting down.");
    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The expiration month of a card was outside of 1 to 12.
    #[error("{0} is not a valid month, expected a number from 1 to 12")]
    InvalidExpiryMonth(u8),

    /// The expiration year of a card did not have four digits.
    #[error("{0} is not a valid year, expected a four digit year")]
    InvalidExpiryYear(i32),

    /// A new card was given an expiration year that has already passed.
    #[error("the card expired in {year}, new cards must expire in {current_year} or later")]
    ExpiredCard {
        /// The expiration year that was given.
        year: i32,
        /// The current year in the configured timezone.
        current_year: i32,
    },

    /// The text did not name one of the supported card types.
    #[error("\"{0}\" is not a supported card type")]
    InvalidCardType(String),

    /// The card ID used to create a transaction did not match a card.
    #[error("the card ID {0} does not refer to a valid card")]
    InvalidCard(CardId),

    /// A category ID used to create a transaction did not match a category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The text could not be parsed as a date in the form `YYYY-MM-DD`.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The text could not be parsed as a color.
    #[error("\"{0}\" is not a valid color, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    /// The text did not name a referential policy.
    #[error("\"{0}\" is not a valid deletion policy")]
    InvalidPolicy(String),

    /// An entity could not be deleted because other entities still refer to it
    /// and the referential policy forbids leaving them behind.
    #[error("cannot delete the {entity} because {references} transaction(s) still refer to it")]
    DeleteRestricted {
        /// The kind of entity, e.g., "card".
        entity: &'static str,
        /// How many transactions refer to the entity.
        references: usize,
    },

    /// The image, or the size it should be scaled to, has a zero width or height.
    #[error("cannot normalize an image with a zero width or height")]
    EmptyImage,

    /// The uploaded bytes could not be decoded as an image.
    #[error("could not read the image: {0}")]
    InvalidImage(String),

    /// The normalized image could not be compressed.
    #[error("could not encode the image: {0}")]
    ImageEncoding(String),

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a card that does not exist
    #[error("tried to update a card that is not in the database")]
    UpdateMissingCard,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a card that does not exist
    #[error("tried to delete a card that is not in the database")]
    DeleteMissingCard,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let (status_code, message, details) = match &self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings",
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::InvalidExpiryMonth(_)
            | Error::InvalidExpiryYear(_)
            | Error::ExpiredCard { .. } => (
                StatusCode::BAD_REQUEST,
                "Invalid expiration date",
                self.to_string(),
            ),
            Error::InvalidCardType(_)
            | Error::InvalidColor(_)
            | Error::InvalidDate(_)
            | Error::EmptyCategoryName => (
                StatusCode::BAD_REQUEST,
                "Invalid form data",
                self.to_string(),
            ),
            Error::InvalidCard(card_id) => (
                StatusCode::BAD_REQUEST,
                "Invalid card ID",
                format!("Could not find a card with the ID {card_id}"),
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                "Invalid category ID",
                format!("Could not find a category with the ID {category_id}"),
            ),
            Error::EmptyImage | Error::InvalidImage(_) | Error::MultipartError(_) => (
                StatusCode::BAD_REQUEST,
                "Could not read the photo",
                self.to_string(),
            ),
            Error::DeleteRestricted { .. } => (
                StatusCode::CONFLICT,
                "Could not delete",
                format!("{}. Delete those transactions first.", capitalize(&self.to_string())),
            ),
            Error::UpdateMissingCard => (
                StatusCode::NOT_FOUND,
                "Could not update card",
                "The card could not be found.".to_owned(),
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                "Could not update category",
                "The category could not be found.".to_owned(),
            ),
            Error::DeleteMissingCard => (
                StatusCode::NOT_FOUND,
                "Could not delete card",
                "The card could not be found. \
                Try refreshing the page to see if the card has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted."
                    .to_owned(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        (
            status_code,
            Alert::Error {
                message: message.to_owned(),
                details,
            }
            .into_html(),
        )
            .into_response()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
