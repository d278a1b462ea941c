//! Displays a card, its purchase total and its transactions.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    card::{Card, CardId},
    category::{Category, CategoryId},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, LINK_STYLE, base, category_badge, color_swatch,
        edit_delete_action_links, format_currency, format_limit, live_region,
    },
    navigation::nav_bar,
    query::{
        SortOrder, TransactionQuery, card_purchase_total, fetch_transactions, get_card,
        list_categories, purchase_total,
    },
    store::Store,
    transaction::transaction_list_view,
};

/// The state needed for the [get_card_page](crate::card::get_card_page) route handler.
#[derive(Debug, Clone)]
pub struct CardPageState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for CardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The category filter, e.g. `?category=1&category=3`.
#[derive(Debug, Default, Deserialize)]
pub struct CardPageQuery {
    #[serde(default)]
    pub category: Vec<CategoryId>,
}

/// Renders a card with its transactions, newest first.
///
/// Only transactions tagged with one of the categories in the query string
/// are listed. Without any categories in the query string every transaction
/// is listed.
pub async fn get_card_page(
    State(state): State<CardPageState>,
    Path(card_id): Path<CardId>,
    Query(query): Query<CardPageQuery>,
) -> Result<Response, Error> {
    let store = state
        .store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let connection = store.connection();

    let card = get_card(card_id, connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve card {card_id}: {error}");
        }
    })?;

    let selected: HashSet<CategoryId> = query.category.into_iter().collect();
    let transaction_query = TransactionQuery::for_card(card_id).with_categories(selected.clone());

    let transactions = fetch_transactions(&transaction_query, connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve transactions for card {card_id}: {error}")
    })?;
    let card_total = card_purchase_total(card_id, connection)?;
    let categories = list_categories(connection, SortOrder::Descending)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let filtered_total = (!selected.is_empty()).then(|| purchase_total(&transactions));
    let transaction_list = transaction_list_view(&transactions);

    Ok(card_view(CardView {
        card: &card,
        card_total,
        filtered_total,
        categories: &categories,
        selected: &selected,
        transaction_list,
    })
    .into_response())
}

struct CardView<'a> {
    card: &'a Card,
    card_total: f64,
    /// The total of the listed transactions if a filter is applied.
    filtered_total: Option<f64>,
    categories: &'a [Category],
    selected: &'a HashSet<CategoryId>,
    transaction_list: Markup,
}

fn card_view(view: CardView) -> Markup {
    let card = view.card;
    let page_url = format_endpoint(endpoints::CARD_VIEW, card.id);
    let nav_bar = nav_bar(endpoints::CARD_VIEW);
    let new_transaction_url = format_endpoint(endpoints::NEW_TRANSACTION_VIEW, card.id);
    let confirm_message = format!("Are you sure you want to delete the card '{}'?", card.name);

    let content = html!(
        section class="w-full max-w-2xl space-y-6"
        {
            (card_details_view(card, view.card_total))

            div class="flex justify-end gap-4"
            {
                (edit_delete_action_links(
                    &format_endpoint(endpoints::EDIT_CARD_VIEW, card.id),
                    &format_endpoint(endpoints::DELETE_CARD, card.id),
                    &confirm_message,
                    "#live-region",
                    "delete",
                ))
            }

            header class="flex justify-between flex-wrap items-end gap-4"
            {
                h2 class="text-xl font-bold" { "Purchases" }

                a href=(new_transaction_url) class=(LINK_STYLE) { "Add Purchase" }
            }

            @if !view.categories.is_empty() {
                (category_filter_view(&page_url, view.categories, view.selected))
            }

            @if let Some(filtered_total) = view.filtered_total {
                p class="text-sm font-semibold" data-filtered-total="true"
                {
                    "Total of shown purchases: " (format_currency(filtered_total))
                }
            }

            (view.transaction_list)
        }
    );

    let content = html!(
        (nav_bar)
        (live_region(&filtered_url(&page_url, view.selected), content))
    );

    base(&card.name, &content)
}

/// The card page URL with the selected categories in the query string.
fn filtered_url(page_url: &str, selected: &HashSet<CategoryId>) -> String {
    let mut category_ids = selected.iter().copied().collect::<Vec<_>>();
    category_ids.sort_unstable();

    let params = category_ids
        .into_iter()
        .map(|id| ("category", id))
        .collect::<Vec<_>>();

    match serde_urlencoded::to_string(params) {
        Ok(query) if !query.is_empty() => format!("{page_url}?{query}"),
        Ok(_) => page_url.to_owned(),
        Err(error) => {
            tracing::warn!("Could not encode the category filter: {error}");
            page_url.to_owned()
        }
    }
}

fn card_details_view(card: &Card, purchase_total: f64) -> Markup {
    let background = format!(
        "background: linear-gradient(to bottom, {} 0%, {} 100%)",
        card.color.with_alpha(153).to_css(),
        card.color.to_css()
    );

    html!(
        article
            class="w-full rounded-lg border border-black/50 p-4 text-white shadow-lg space-y-4"
            style=(background)
        {
            div class="flex items-center justify-between gap-4"
            {
                h1 class="text-2xl font-semibold" { (card.name) }
                (color_swatch(card.color))
            }

            div class="flex items-center justify-between gap-4"
            {
                span class="text-lg font-bold uppercase" { (card.card_type) }
                span class="text-lg font-semibold" data-purchase-total="true"
                {
                    "Purchase total: " (format_currency(purchase_total))
                }
            }

            p class="tabular-nums" { (card.number) }

            div class="flex items-end justify-between gap-4 text-xs font-semibold"
            {
                span data-credit-limit="true" { "Credit limit " (format_limit(card.limit)) }

                div class="text-right"
                {
                    p { "Valid thru" }
                    p class="text-base tabular-nums" data-expiry="true"
                    {
                        (card.expiry.to_short_string())
                    }
                }
            }
        }
    )
}

fn category_filter_view(
    page_url: &str,
    categories: &[Category],
    selected: &HashSet<CategoryId>,
) -> Markup {
    html!(
        form method="get" action=(page_url) class="space-y-2"
        {
            fieldset class="flex flex-wrap gap-3"
            {
                legend class="mb-2 text-sm font-medium" { "Filter by category" }

                @for category in categories {
                    label class="flex items-center gap-2"
                    {
                        input
                            type="checkbox"
                            name="category"
                            value=(category.id)
                            checked[selected.contains(&category.id)]
                            class=(FORM_CHECKBOX_STYLE);

                        (category_badge(category.name.as_ref(), category.color))
                    }
                }
            }

            div class="flex items-center gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }

                @if !selected.is_empty() {
                    a href=(page_url) class=(LINK_STYLE) { "Clear" }
                }
            }
        }
    )
}
