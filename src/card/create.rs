//! Card creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    card::form::{CardFormConfig, CardFormData, card_form_view, check_not_expired},
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::nav_bar,
    store::Store,
    timezone::local_today,
};

/// The state needed for creating a card.
#[derive(Debug, Clone)]
pub struct CreateCardState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for CreateCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            store: state.store.clone(),
        }
    }
}

/// Render the card creation page.
pub async fn get_new_card_page(State(state): State<CreateCardState>) -> Result<Response, Error> {
    let current_year = local_today(&state.local_timezone)?.year();

    Ok(new_card_view(current_year).into_response())
}

/// Handle card creation form submission.
///
/// Redirects to the new card's page on success.
pub async fn create_card_endpoint(
    State(state): State<CreateCardState>,
    Form(form): Form<CardFormData>,
) -> Response {
    let current_year = match local_today(&state.local_timezone) {
        Ok(today) => today.year(),
        Err(error) => return error.into_alert_response(),
    };

    let draft = match form.into_draft(None) {
        Ok(draft) => draft,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = check_not_expired(draft.expiry.year(), current_year) {
        return error.into_alert_response();
    }

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
            tracing::error!("An unexpected error occurred while creating a card: {error}");
            error.into_alert_response()
        }
    }
}

fn new_card_view(current_year: i32) -> Markup {
    let nav_bar = nav_bar(endpoints::NEW_CARD_VIEW);
    let form = card_form_view(CardFormConfig {
        card: None,
        current_year,
    });

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Add a credit card" }
            (form)
        }
    };

    base("Add Card", &content)
}
