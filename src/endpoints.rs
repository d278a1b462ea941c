//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/cards/{card_id}', use [format_endpoint].

/// The root route which redirects to the cards page.
pub const ROOT: &str = "/";
/// The page listing all cards.
pub const CARDS_VIEW: &str = "/cards";
/// The page for a single card and its transactions.
pub const CARD_VIEW: &str = "/cards/{card_id}";
/// The page for creating a new card.
pub const NEW_CARD_VIEW: &str = "/card/new";
/// The page for editing an existing card.
pub const EDIT_CARD_VIEW: &str = "/cards/{card_id}/edit";
/// The page for adding a transaction to a card.
pub const NEW_TRANSACTION_VIEW: &str = "/cards/{card_id}/transactions/new";
/// The page for listing and creating categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a card.
pub const POST_CARD: &str = "/api/cards";
/// The route to update a card.
pub const PUT_CARD: &str = "/api/cards/{card_id}";
/// The route to delete a card.
pub const DELETE_CARD: &str = "/api/cards/{card_id}";
/// The route to create a transaction for a card.
pub const POST_TRANSACTION: &str = "/api/cards/{card_id}/transactions";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to get the receipt photo of a transaction.
pub const TRANSACTION_PHOTO: &str = "/api/transactions/{transaction_id}/photo";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}";
/// The route streaming store changes as server-sent events.
pub const EVENTS: &str = "/api/events";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/cards/{card_id}', '{card_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::CARDS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_CARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_CARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::POST_CARD);
        assert_endpoint_is_valid_uri(endpoints::PUT_CARD);
        assert_endpoint_is_valid_uri(endpoints::DELETE_CARD);
        assert_endpoint_is_valid_uri(endpoints::POST_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::DELETE_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_PHOTO);
        assert_endpoint_is_valid_uri(endpoints::POST_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::DELETE_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::EVENTS);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(super::NEW_TRANSACTION_VIEW, 7);

        assert_eq!(formatted_path, "/cards/7/transactions/new");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
