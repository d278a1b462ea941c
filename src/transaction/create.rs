//! Defines the page and endpoint for adding a purchase to a card.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Multipart, Path, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use time::{Date, macros::format_description};

use crate::{
    AppState, Error,
    card::{Card, CardId},
    category::{Category, CategoryId},
    endpoints::{self, format_endpoint},
    form_input::parse_amount,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, category_badge, loading_spinner,
    },
    navigation::nav_bar,
    photo::{RECEIPT_PHOTO_SIZE, normalize},
    query::{SortOrder, get_card, list_categories},
    store::Store,
    timezone::local_today,
    transaction::TransactionDraft,
};

/// The state needed for adding a purchase.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            store: state.store.clone(),
        }
    }
}

/// Renders the page for adding a purchase to a card.
///
/// The date defaults to today and the newest category is preselected.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionState>,
    Path(card_id): Path<CardId>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

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

    let categories = list_categories(store.connection(), SortOrder::Descending)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(new_transaction_view(&card, today, &categories).into_response())
}

/// Handle the multipart form for adding a purchase.
///
/// The receipt photo, if any, is normalized before the store is locked.
/// Redirects to the card's page on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Path(card_id): Path<CardId>,
    multipart: Multipart,
) -> Response {
    let form = match TransactionFormData::read(multipart).await {
        Ok(form) => form,
        Err(error) => {
            tracing::debug!("Could not read the transaction form: {error}");
            return error.into_alert_response();
        }
    };

    let date = match form.date.as_deref().map(str::trim) {
        None | Some("") => match local_today(&state.local_timezone) {
            Ok(today) => today,
            Err(error) => return error.into_alert_response(),
        },
        Some(text) => match parse_date(text) {
            Ok(date) => date,
            Err(error) => return error.into_alert_response(),
        },
    };

    let photo = match form.photo {
        Some(raw) => match normalize_receipt(raw).await {
            Ok(photo) => Some(photo),
            Err(error) => {
                tracing::debug!("Could not normalize the receipt photo: {error}");
                return error.into_alert_response();
            }
        },
        None => None,
    };

    let draft = TransactionDraft {
        card_id,
        name: form.name.trim().to_owned(),
        amount: parse_amount(&form.amount),
        date,
        photo,
        categories: form.categories,
    };

    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match store.save(draft) {
        Ok(_) => (
            HxRedirect(format_endpoint(endpoints::CARD_VIEW, card_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidCard(_) | Error::InvalidCategory(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");
            error.into_alert_response()
        }
    }
}

/// The fields of the new transaction form.
#[derive(Debug, Default, PartialEq)]
struct TransactionFormData {
    name: String,
    amount: String,
    date: Option<String>,
    categories: Vec<CategoryId>,
    /// The uploaded photo as sent by the browser, `None` if no file was picked.
    photo: Option<Vec<u8>>,
}

impl TransactionFormData {
    async fn read(mut multipart: Multipart) -> Result<Self, Error> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|error| Error::MultipartError(error.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "name" => form.name = read_text(field).await?,
                "amount" => form.amount = read_text(field).await?,
                "date" => form.date = Some(read_text(field).await?),
                "category" => {
                    let text = read_text(field).await?;
                    let category_id = text.trim().parse().map_err(|_| {
                        Error::MultipartError(format!("\"{text}\" is not a category ID"))
                    })?;
                    form.categories.push(category_id);
                }
                "photo" => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|error| Error::MultipartError(error.body_text()))?;

                    if !bytes.is_empty() {
                        form.photo = Some(bytes.to_vec());
                    }
                }
                other => tracing::debug!("Ignoring unexpected form field {other:?}"),
            }
        }

        Ok(form)
    }
}

async fn read_text(field: Field<'_>) -> Result<String, Error> {
    field
        .text()
        .await
        .map_err(|error| Error::MultipartError(error.body_text()))
}

fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Scale, crop and compress a receipt photo on the blocking thread pool.
async fn normalize_receipt(raw: Vec<u8>) -> Result<Vec<u8>, Error> {
    tokio::task::spawn_blocking(move || normalize(&raw, RECEIPT_PHOTO_SIZE))
        .await
        .map_err(|error| Error::ImageEncoding(error.to_string()))?
}

fn new_transaction_view(card: &Card, today: Date, categories: &[Category]) -> Markup {
    let nav_bar = nav_bar(endpoints::NEW_TRANSACTION_VIEW);
    let create_transaction_url = format_endpoint(endpoints::POST_TRANSACTION, card.id);
    let card_url = format_endpoint(endpoints::CARD_VIEW, card.id);
    let preselected = categories.first().map(|category| category.id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(create_transaction_url)
                hx-encoding="multipart/form-data"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New purchase on " (card.name) }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        name="name"
                        id="name"
                        type="text"
                        placeholder="Name"
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        name="amount"
                        id="amount"
                        type="text"
                        inputmode="decimal"
                        placeholder="0.00"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(today)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if !categories.is_empty() {
                    fieldset class="space-y-2"
                    {
                        legend class=(FORM_LABEL_STYLE) { "Categories" }

                        div class="flex flex-wrap gap-3"
                        {
                            @for category in categories {
                                label class="flex items-center gap-2"
                                {
                                    input
                                        type="checkbox"
                                        name="category"
                                        value=(category.id)
                                        checked[Some(category.id) == preselected]
                                        class=(FORM_CHECKBOX_STYLE);

                                    (category_badge(category.name.as_ref(), category.color))
                                }
                            }
                        }
                    }
                }

                div
                {
                    label for="photo" class=(FORM_LABEL_STYLE) { "Receipt photo" }

                    input
                        name="photo"
                        id="photo"
                        type="file"
                        accept="image/jpeg,image/png"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="flex items-center justify-between gap-4"
                {
                    a href=(card_url) class=(LINK_STYLE) { "Cancel" }

                    button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span id="indicator" class="inline htmx-indicator"
                        {
                            (loading_spinner())
                        }
                        " Save"
                    }
                }
            }
        }
    };

    base("Add Purchase", &content)
}
