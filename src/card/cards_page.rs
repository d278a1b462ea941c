//! Displays every card with its purchase total.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    card::Card,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, color_swatch,
        edit_delete_action_links, format_currency, format_limit, live_region,
    },
    navigation::nav_bar,
    query::{SortOrder, card_purchase_total, list_cards},
    store::Store,
};

/// The state needed for the [get_cards_page](crate::card::get_cards_page) route handler.
#[derive(Debug, Clone)]
pub struct CardsPageState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for CardsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The card data to display in the view
#[derive(Debug, PartialEq)]
struct CardTableRow {
    card: Card,
    purchase_total: f64,
    view_url: String,
    edit_url: String,
    delete_url: String,
}

/// Renders the page listing every card, newest first.
pub async fn get_cards_page(State(state): State<CardsPageState>) -> Result<Response, Error> {
    let store = state
        .store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let connection = store.connection();

    let cards = list_cards(connection, SortOrder::Descending)
        .inspect_err(|error| tracing::error!("Failed to retrieve cards: {error}"))?;

    let rows = cards
        .into_iter()
        .map(|card| {
            let purchase_total = card_purchase_total(card.id, connection)?;

            Ok(CardTableRow {
                view_url: format_endpoint(endpoints::CARD_VIEW, card.id),
                edit_url: format_endpoint(endpoints::EDIT_CARD_VIEW, card.id),
                delete_url: format_endpoint(endpoints::DELETE_CARD, card.id),
                purchase_total,
                card,
            })
        })
        .collect::<Result<Vec<_>, Error>>()
        .inspect_err(|error| tracing::error!("Failed to calculate purchase totals: {error}"))?;

    Ok(cards_view(&rows).into_response())
}

fn cards_view(cards: &[CardTableRow]) -> Markup {
    let new_card_url = endpoints::NEW_CARD_VIEW;
    let nav_bar = nav_bar(endpoints::CARDS_VIEW);

    let table_row = |row: &CardTableRow| {
        let confirm_message = format!(
            "Are you sure you want to delete the card '{}'?",
            row.card.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-card-id=(row.card.id)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex items-center gap-2"
                    {
                        (color_swatch(row.card.color))
                        a href=(row.view_url) class=(LINK_STYLE) { (row.card.name) }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (row.card.card_type) }

                td class="px-6 py-4 tabular-nums" { (row.card.number) }

                td class="px-6 py-4 tabular-nums" { (row.card.expiry.to_short_string()) }

                td class="px-6 py-4 text-right tabular-nums" { (format_limit(row.card.limit)) }

                td class="px-6 py-4 text-right tabular-nums"
                {
                    (format_currency(row.purchase_total))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        section class="space-y-4 w-full lg:max-w-5xl"
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h1 class="text-xl font-bold" { "Your Cards" }

                a href=(new_card_url) class=(LINK_STYLE) { "Add Card" }
            }

            @if cards.is_empty() {
                p class="text-center text-gray-500 dark:text-gray-400"
                {
                    "You don't have any cards yet. "
                    a href=(new_card_url) class=(LINK_STYLE) { "Add your first card" }
                }
            } @else {
                div class="overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Number" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Expires" }
                                th scope="col" class="px-6 py-4 text-right" { "Credit limit" }
                                th scope="col" class="px-6 py-4 text-right" { "Purchase total" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in cards {
                                (table_row(row))
                            }
                        }
                    }
                }
            }
        }
    );

    let content = html!(
        (nav_bar)
        (live_region(endpoints::CARDS_VIEW, content))
    );

    base("Cards", &content)
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_content_type, assert_valid_html, must_create_card, must_create_test_store,
            must_create_transaction, parse_html_document,
        },
    };

    use super::{CardsPageState, get_cards_page};

    #[tokio::test]
    async fn lists_cards_newest_first_with_totals() {
        let store = must_create_test_store();
        let older = must_create_card("Old Card", &store);
        let newer = must_create_card("Visa Gold", &store);
        must_create_transaction(&newer, 42.5, date!(2025 - 05 - 01), &[], &store);
        must_create_transaction(&newer, 7.5, date!(2025 - 05 - 02), &[], &store);
        let state = CardsPageState { store };

        let response = get_cards_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].value().attr("data-card-id"),
            Some(newer.id.to_string().as_str())
        );
        assert_eq!(
            rows[1].value().attr("data-card-id"),
            Some(older.id.to_string().as_str())
        );

        let first_row_text = rows[0].text().collect::<String>();
        assert!(first_row_text.contains("Visa Gold"));
        assert!(first_row_text.contains("50.00 ₽"));
        assert!(first_row_text.contains("5,000 ₽"));
        assert!(first_row_text.contains("12/30"));

        let link = rows[0]
            .select(&Selector::parse("a").unwrap())
            .next()
            .expect("No card link found");
        assert_eq!(
            link.value().attr("href"),
            Some(format_endpoint(endpoints::CARD_VIEW, newer.id).as_str())
        );
    }

    #[tokio::test]
    async fn shows_prompt_without_cards() {
        let state = CardsPageState {
            store: must_create_test_store(),
        };

        let response = get_cards_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("You don't have any cards yet."));
        assert_eq!(html.select(&Selector::parse("table").unwrap()).count(), 0);
    }
}
