//! Category creation form and endpoint.

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
    category::{CategoryDraft, CategoryFormData, CategoryName},
    color::Color,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_COLOR_INPUT_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    store::Store,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub store: Arc<Mutex<Store>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// Handle category creation form submission.
///
/// An empty name re-renders the form with an error message.
/// Redirects to the categories page on success.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let color = match Color::from_hex(&form.color) {
        Ok(color) => color,
        Err(error) => return error.into_alert_response(),
    };

    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match store.save(CategoryDraft::new(name, color)) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            error.into_alert_response()
        }
    }
}

/// The form for creating a category, new categories are red unless another
/// color is picked.
pub(crate) fn new_category_form_view(error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div class="flex flex-wrap items-end gap-4"
            {
                div class="grow"
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="Groceries"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }

                    input
                        id="color"
                        type="color"
                        name="color"
                        value=(Color::RED.to_hex())
                        class=(FORM_COLOR_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }
        }
    }
}
