//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    alert::Alert,
    store::{EntityRef, Store},
    transaction::TransactionId,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match store.delete(EntityRef::Transaction(transaction_id)) {
        // The status code has to be 200 OK or HTMX will not remove the list item.
        Ok(()) => Alert::SuccessSimple {
            message: "Purchase deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        Error,
        query::{get_transaction, get_transaction_photo},
        test_utils::{
            assert_valid_html, must_create_card, must_create_test_store, must_create_transaction,
            parse_html_fragment,
        },
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn deletes_transaction() {
        let store = must_create_test_store();
        let card = must_create_card("Visa Gold", &store);
        let transaction = must_create_transaction(&card, 9.99, date!(2025 - 06 - 01), &[], &store);
        let state = DeleteTransactionState { store };

        let response =
            delete_transaction_endpoint(State(state.clone()), Path(transaction.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_valid_html(&parse_html_fragment(response).await);
        let store = state.store.lock().unwrap();
        assert_eq!(
            get_transaction(transaction.id, store.connection()),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_transaction_photo(transaction.id, store.connection()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_missing_transaction_is_not_found() {
        let state = DeleteTransactionState {
            store: must_create_test_store(),
        };

        let response = delete_transaction_endpoint(State(state), Path(31)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
