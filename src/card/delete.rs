//! Defines the endpoint for deleting a card.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    alert::Alert,
    card::CardId,
    query::{TransactionQuery, fetch_transactions},
    store::{CardDeletion, EntityRef, Store},
};

/// The state needed to delete a card.
#[derive(Debug, Clone)]
pub struct DeleteCardState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for DeleteCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// A route handler for deleting a card, responds with an alert.
///
/// What happens to the card's transactions depends on the store's
/// [CardDeletion] policy.
pub async fn delete_card_endpoint(
    State(state): State<DeleteCardState>,
    Path(card_id): Path<CardId>,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction_count =
        match fetch_transactions(&TransactionQuery::for_card(card_id), store.connection()) {
            Ok(transactions) => transactions.len(),
            Err(error) => {
                tracing::error!("Could not count the transactions of card {card_id}: {error}");
                return error.into_alert_response();
            }
        };

    match store.delete(EntityRef::Card(card_id)) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => deleted_alert(store.policy().card, transaction_count).into_response(),
        Err(error) => {
            tracing::error!("Could not delete card {card_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn deleted_alert(policy: CardDeletion, transaction_count: usize) -> Alert {
    let message = "Card deleted successfully".to_owned();

    match (policy, transaction_count) {
        (_, 0) | (CardDeletion::Restrict, _) => Alert::SuccessSimple { message },
        (CardDeletion::Orphan, count) => Alert::Success {
            message,
            details: format!("{count} transaction(s) were kept without a card."),
        },
        (CardDeletion::Cascade, count) => Alert::Success {
            message,
            details: format!("{count} transaction(s) were deleted with the card."),
        },
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
        query::{get_card, get_transaction},
        store::{CardDeletion, ReferentialPolicy},
        test_utils::{
            assert_valid_html, must_create_card, must_create_test_store,
            must_create_test_store_with_policy, must_create_transaction, parse_html_fragment,
        },
    };

    use super::{DeleteCardState, delete_card_endpoint};

    #[tokio::test]
    async fn deletes_card_and_keeps_transactions_by_default() {
        let store = must_create_test_store();
        let card = must_create_card("Visa Gold", &store);
        let transaction = must_create_transaction(&card, 1.0, date!(2025 - 01 - 01), &[], &store);
        let state = DeleteCardState { store };

        let response = delete_card_endpoint(State(state.clone()), Path(card.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("1 transaction(s) were kept without a card."));

        let store = state.store.lock().unwrap();
        assert_eq!(get_card(card.id, store.connection()), Err(Error::NotFound));
        assert!(get_transaction(transaction.id, store.connection()).is_ok());
    }

    #[tokio::test]
    async fn restricted_delete_is_a_conflict() {
        let store = must_create_test_store_with_policy(ReferentialPolicy {
            card: CardDeletion::Restrict,
            ..Default::default()
        });
        let card = must_create_card("Visa Gold", &store);
        must_create_transaction(&card, 1.0, date!(2025 - 01 - 01), &[], &store);
        let state = DeleteCardState { store };

        let response = delete_card_endpoint(State(state.clone()), Path(card.id)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let store = state.store.lock().unwrap();
        assert!(get_card(card.id, store.connection()).is_ok());
    }

    #[tokio::test]
    async fn deleting_missing_card_is_not_found() {
        let state = DeleteCardState {
            store: must_create_test_store(),
        };

        let response = delete_card_endpoint(State(state), Path(123)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Could not delete card"));
    }
}
