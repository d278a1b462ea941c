//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    alert::Alert,
    category::CategoryId,
    store::{CategoryDeletion, EntityRef, Store},
    transaction_category::count_transactions_per_category,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// Handle category deletion. Returns success alert or error.
///
/// What happens to the tagged transactions depends on the store's
/// [CategoryDeletion] policy.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction_count = match count_transactions_per_category(store.connection()) {
        Ok(counts) => counts.get(&category_id).copied().unwrap_or(0),
        Err(error) => {
            tracing::error!("Could not count the transactions of category {category_id}: {error}");
            return error.into_alert_response();
        }
    };

    match store.delete(EntityRef::Category(category_id)) {
        Ok(()) => deleted_alert(store.policy().category, transaction_count).into_response(),
        Err(error @ (Error::DeleteMissingCategory | Error::DeleteRestricted { .. })) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn deleted_alert(policy: CategoryDeletion, transaction_count: usize) -> Alert {
    let message = "Category deleted successfully".to_owned();

    match (policy, transaction_count) {
        (_, 0) | (CategoryDeletion::Restrict, _) | (CategoryDeletion::Orphan, _) => {
            Alert::SuccessSimple { message }
        }
        (CategoryDeletion::Detach, count) => Alert::Success {
            message,
            details: format!("The category was removed from {count} transaction(s)."),
        },
        (CategoryDeletion::Cascade, count) => Alert::Success {
            message,
            details: format!("{count} transaction(s) were deleted with the category."),
        },
    }
}
