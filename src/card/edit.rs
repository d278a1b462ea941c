//! Card editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    card::{
        Card, CardId,
        form::{CardFormConfig, CardFormData, card_form_view},
    },
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::nav_bar,
    query::get_card,
    store::Store,
    timezone::local_today,
};

/// The state needed for the edit card page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCardState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for EditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            store: state.store.clone(),
        }
    }
}

/// Renders the page for editing a card.
pub async fn get_edit_card_page(
    State(state): State<EditCardState>,
    Path(card_id): Path<CardId>,
) -> Result<Response, Error> {
    let current_year = local_today(&state.local_timezone)?.year();

    let store = state
        .store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let card = get_card(card_id, store.connection()).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve card {card_id}: {error}");
        }
    })?;

    Ok(edit_card_view(&card, current_year).into_response())
}

/// Handle the edit card form submission.
///
/// The card keeps its ID and creation time. Redirects to the card's page on success.
pub async fn edit_card_endpoint(
    State(state): State<EditCardState>,
    Path(card_id): Path<CardId>,
    Form(form): Form<CardFormData>,
) -> Response {
    let draft = match form.into_draft(Some(card_id)) {
        Ok(draft) => draft,
        Err(error) => return error.into_alert_response(),
    };

    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match store.save(draft) {
        Ok(card) => (
            HxRedirect(format_endpoint(endpoints::CARD_VIEW, card.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update card {card_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_card_view(card: &Card, current_year: i32) -> Markup {
    let nav_bar = nav_bar(endpoints::EDIT_CARD_VIEW);
    let form = card_form_view(CardFormConfig {
        card: Some(card),
        current_year,
    });

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { (card.name) }
            (form)
        }
    };

    base("Edit Card", &content)
}

#[cfg(test)]
mod edit_card_page_tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        Error,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html,
            must_create_card, must_create_test_store, must_get_form, parse_html_document,
        },
    };

    use super::{EditCardState, get_edit_card_page};

    #[tokio::test]
    async fn form_is_filled_with_card() {
        let store = must_create_test_store();
        let card = must_create_card("Visa Gold", &store);
        let state = EditCardState {
            local_timezone: "Etc/UTC".to_owned(),
            store,
        };

        let response = get_edit_card_page(State(state), Path(card.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::PUT_CARD, card.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Visa Gold");

        let selected_month = form
            .select(&Selector::parse("select[name=month] option[selected]").unwrap())
            .next()
            .and_then(|option| option.value().attr("value"));
        assert_eq!(selected_month, Some("12"));

        let selected_year = form
            .select(&Selector::parse("select[name=year] option[selected]").unwrap())
            .next()
            .and_then(|option| option.value().attr("value"));
        assert_eq!(selected_year, Some("2030"));
    }

    #[tokio::test]
    async fn missing_card_is_not_found() {
        let state = EditCardState {
            local_timezone: "Etc/UTC".to_owned(),
            store: must_create_test_store(),
        };

        let result = get_edit_card_page(State(state), Path(7)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}

#[cfg(test)]
mod edit_card_endpoint_tests {
    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        card::{CardType, form::CardFormData},
        endpoints::{self, format_endpoint},
        query::get_card,
        test_utils::{assert_hx_redirect, must_create_card, must_create_test_store},
    };

    use super::{EditCardState, edit_card_endpoint};

    fn form_data() -> CardFormData {
        CardFormData {
            name: "Mir Classic".to_owned(),
            number: "2200".to_owned(),
            limit: "1000".to_owned(),
            card_type: "Mir".to_owned(),
            month: 3,
            year: 2031,
            color: "#af52de".to_owned(),
        }
    }

    #[tokio::test]
    async fn updates_card_in_place() {
        let store = must_create_test_store();
        let card = must_create_card("Visa Gold", &store);
        let state = EditCardState {
            local_timezone: "Etc/UTC".to_owned(),
            store,
        };

        let response =
            edit_card_endpoint(State(state.clone()), Path(card.id), Form(form_data())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, &format_endpoint(endpoints::CARD_VIEW, card.id));
        let store = state.store.lock().unwrap();
        let got = get_card(card.id, store.connection()).unwrap();
        assert_eq!(got.id, card.id);
        assert_eq!(got.name, "Mir Classic");
        assert_eq!(got.card_type, CardType::Mir);
        assert_eq!(got.limit, 1000);
        assert_eq!(got.expiry.to_short_string(), "03/31");
        assert_eq!(got.created_at, card.created_at);
    }

    #[tokio::test]
    async fn rejects_year_without_four_digits() {
        let store = must_create_test_store();
        let card = must_create_card("Visa Gold", &store);
        let state = EditCardState {
            local_timezone: "Etc/UTC".to_owned(),
            store,
        };

        for year in [5, 123_456] {
            let form = CardFormData {
                year,
                ..form_data()
            };

            let response =
                edit_card_endpoint(State(state.clone()), Path(card.id), Form(form)).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "year {year}");
        }

        let store = state.store.lock().unwrap();
        let got = get_card(card.id, store.connection()).unwrap();
        assert_eq!(got.name, card.name);
        assert_eq!(got.expiry, card.expiry);
    }

    #[tokio::test]
    async fn updating_missing_card_is_not_found() {
        let state = EditCardState {
            local_timezone: "Etc/UTC".to_owned(),
            store: must_create_test_store(),
        };

        let response = edit_card_endpoint(State(state), Path(99), Form(form_data())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
