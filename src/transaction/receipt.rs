//! Serves the stored receipt photo of a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error, query::get_transaction_photo, store::Store, transaction::TransactionId,
};

/// The state needed to serve receipt photos.
#[derive(Debug, Clone)]
pub struct ReceiptPhotoState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for ReceiptPhotoState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// Respond with the transaction's receipt as a JPEG.
///
/// Responds with the 404 page if the transaction does not exist or has no photo.
pub async fn get_transaction_photo_endpoint(
    State(state): State<ReceiptPhotoState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let store = state
        .store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let photo = get_transaction_photo(transaction_id, store.connection())
        .inspect_err(|error| {
            if *error != Error::NotFound {
                tracing::error!("Failed to retrieve the photo of transaction {transaction_id}: {error}");
            }
        })?
        .ok_or(Error::NotFound)?;

    // Transactions cannot be edited, so a photo never changes.
    Ok((
        [
            (CONTENT_TYPE, "image/jpeg"),
            (CACHE_CONTROL, "private, max-age=31536000, immutable"),
        ],
        photo,
    )
        .into_response())
}
