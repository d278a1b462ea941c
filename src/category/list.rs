//! Categories page: lists categories and embeds the form for creating one.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    category::{Category, create::new_category_form_view},
    endpoints::{self, format_endpoint},
    html::{
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, category_badge,
        edit_delete_action_links, live_region,
    },
    navigation::nav_bar,
    query::{SortOrder, list_categories},
    store::{CategoryDeletion, Store},
    transaction_category::count_transactions_per_category,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// A category with the number of transactions tagged with it.
#[derive(Debug, Clone)]
struct CategoryRow {
    category: Category,
    transaction_count: usize,
}

/// Render the categories page, newest category first.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
) -> Result<Response, Error> {
    let store = state
        .store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = list_categories(store.connection(), SortOrder::Descending)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transactions_per_category = count_transactions_per_category(store.connection())
        .inspect_err(|error| {
            tracing::error!("Could not count transactions per category: {error}")
        })?;

    let rows = categories
        .into_iter()
        .map(|category| CategoryRow {
            transaction_count: transactions_per_category
                .get(&category.id)
                .copied()
                .unwrap_or(0),
            category,
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&rows, store.policy().category).into_response())
}

fn delete_confirm_message(row: &CategoryRow, policy: CategoryDeletion) -> String {
    let name = &row.category.name;
    let count = row.transaction_count;

    match policy {
        CategoryDeletion::Detach => format!(
            "Are you sure you want to delete '{name}'? This will remove it from {count} transaction(s)."
        ),
        CategoryDeletion::Cascade => format!(
            "Are you sure you want to delete '{name}'? This will also delete {count} transaction(s)."
        ),
        CategoryDeletion::Orphan | CategoryDeletion::Restrict => {
            format!("Are you sure you want to delete '{name}'?")
        }
    }
}

fn categories_view(categories: &[CategoryRow], policy: CategoryDeletion) -> Markup {
    let nav_bar = nav_bar(endpoints::CATEGORIES_VIEW);

    let table_row = |row: &CategoryRow| {
        let delete_url = format_endpoint(endpoints::DELETE_CATEGORY, row.category.id);

        html!(
            tr class=(TABLE_ROW_STYLE) data-category-id=(row.category.id)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (category_badge(row.category.name.as_ref(), row.category.color))
                }

                td class=(TABLE_CELL_STYLE) { (row.transaction_count) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            "",
                            &delete_url,
                            &delete_confirm_message(row, policy),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        section class="w-full max-w-2xl space-y-6"
        {
            h1 class="text-xl font-bold" { "Categories" }

            (new_category_form_view(""))

            table class="w-full text-sm text-left rtl:text-right
                text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in categories {
                        (table_row(row))
                    }

                    @if categories.is_empty() {
                        tr
                        {
                            td
                                colspan="3"
                                class="px-6 py-4 text-center
                                    text-gray-500 dark:text-gray-400"
                            {
                                "No categories created yet."
                            }
                        }
                    }
                }
            }
        }
    );

    let content = html!(
        (nav_bar)
        (live_region(endpoints::CATEGORIES_VIEW, content))
    );

    base("Categories", &content)
}
