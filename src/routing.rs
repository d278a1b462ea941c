//! Application router configuration.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    card::{
        create_card_endpoint, delete_card_endpoint, edit_card_endpoint, get_card_page,
        get_cards_page, get_edit_card_page, get_new_card_page,
    },
    category::{create_category_endpoint, delete_category_endpoint, get_categories_page},
    endpoints,
    events::get_store_events,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_new_transaction_page,
        get_transaction_photo_endpoint,
    },
};

/// The largest receipt upload accepted, in bytes.
const MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CARDS_VIEW, get(get_cards_page))
        .route(endpoints::CARD_VIEW, get(get_card_page))
        .route(endpoints::NEW_CARD_VIEW, get(get_new_card_page))
        .route(endpoints::EDIT_CARD_VIEW, get(get_edit_card_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api = Router::new()
        .route(endpoints::POST_CARD, post(create_card_endpoint))
        .route(endpoints::PUT_CARD, put(edit_card_endpoint))
        .route(endpoints::DELETE_CARD, delete(delete_card_endpoint))
        .route(
            endpoints::POST_TRANSACTION,
            post(create_transaction_endpoint).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_PHOTO,
            get(get_transaction_photo_endpoint),
        )
        .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
        .route(endpoints::DELETE_CATEGORY, delete(delete_category_endpoint))
        .route(endpoints::EVENTS, get(get_store_events));

    pages
        .merge(api)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' redirects to the cards page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CARDS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_cards() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::CARDS_VIEW);
    }
}
