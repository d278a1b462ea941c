//! Alert system for displaying success and error messages to users.
//!
//! Alerts are HTML fragments swapped into the `#alert-container` element of
//! the base page by htmx.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A message to show the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with instructions for fixing the problem.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div
                class=(container_style)
                role="alert"
                hx-swap-oob="innerHTML:#alert-container"
            {
                div class="flex justify-between items-start gap-4"
                {
                    div
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="text-sm font-semibold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "Dismiss"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        // The status code has to be 200 OK or htmx will not swap the content.
        (StatusCode::OK, self.into_html()).into_response()
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 text-green-800 rounded-lg bg-green-50 \
    dark:bg-gray-800 dark:text-green-400";

const ERROR_STYLE: &str = "p-4 mb-4 text-red-800 rounded-lg bg-red-50 \
    dark:bg-gray-800 dark:text-red-400";
