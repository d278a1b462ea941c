use maud::{DOCTYPE, Markup, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

use crate::{color::Color, endpoints};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "block w-full text-center py-2.5 px-5 mb-2 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_COLOR_INPUT_STYLE: &str = "h-10 w-full cursor-pointer rounded border \
    border-gray-300 dark:border-gray-600 bg-gray-50 dark:bg-gray-700";
pub const FORM_CHECKBOX_STYLE: &str = "h-4 w-4 shrink-0 cursor-pointer rounded \
    text-blue-600 border-gray-300 dark:border-gray-600";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Category badge style, the background color is set per category.
pub const CATEGORY_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-white rounded-full";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Money Tracker" }
                link href={ (endpoints::STATIC) "/main.css" } rel="stylesheet";

                script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js" {}
                script src="https://unpkg.com/htmx-ext-response-targets@2.0.4/response-targets.js" {}
                script src="https://unpkg.com/htmx-ext-sse@2.2.3/sse.js" {}
            }

            body
                hx-ext="response-targets, sse"
                sse-connect=(endpoints::EVENTS)
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

/// A `main` element that re-renders itself from `url` whenever the store
/// reports a change.
pub fn live_region(url: &str, content: Markup) -> Markup {
    html! {
        main
            id="live-region"
            class=(PAGE_CONTAINER_STYLE)
            hx-get=(url)
            hx-trigger="sse:store-changed"
            hx-select="#live-region"
            hx-target="this"
            hx-swap="outerHTML"
        {
            (content)
        }
    }
}

/// A full page explaining what went wrong, with a link back to the cards.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        main class="mx-auto max-w-screen-sm px-4 py-16 text-center text-gray-900 dark:text-white"
        {
            h1 class="mb-4 text-7xl font-extrabold text-blue-600 dark:text-blue-500" { (header) }
            p class="mb-4 text-3xl font-bold" { (description) }
            p class="mb-4 text-xl" { (fix) }

            a
                href=(endpoints::ROOT)
                class="inline-flex my-4 px-5 py-2.5 rounded text-sm font-medium text-white
                    bg-blue-600 hover:bg-blue-800"
            {
                "Back to my cards"
            }
        }
    );

    base(title, &content)
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Group the digits of a whole number with commas, e.g., "1,234,567".
fn group_digits(whole: u64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    if whole == 0 {
        // numfmt renders zero as "0" regardless of the precision.
        return "0".to_owned();
    }

    let fmt = FMT.get_or_init(|| {
        Formatter::currency("")
            .unwrap_or_else(|_| Formatter::new())
            .precision(Precision::Decimals(0))
    });

    fmt.fmt_string(whole as f64)
}

/// Format `number` as rubles with two decimal places, e.g., "1,234.50 ₽".
pub fn format_currency(number: f64) -> String {
    let kopecks = (number.abs() * 100.0).round() as u64;
    let sign = if number < 0.0 && kopecks > 0 { "-" } else { "" };

    format!(
        "{sign}{}.{:02} ₽",
        group_digits(kopecks / 100),
        kopecks % 100
    )
}

/// Format a whole number of rubles, e.g., "5,000 ₽".
pub fn format_limit(limit: i64) -> String {
    let sign = if limit < 0 { "-" } else { "" };

    format!("{sign}{} ₽", group_digits(limit.unsigned_abs()))
}

/// A small rounded badge showing `name` on a `color` background.
pub fn category_badge(name: &str, color: Color) -> Markup {
    html! {
        span class=(CATEGORY_BADGE_STYLE) style={ "background-color: " (color.to_css()) }
        {
            (name)
        }
    }
}

/// A square swatch filled with `color`.
pub fn color_swatch(color: Color) -> Markup {
    html! {
        span
            class="inline-block h-4 w-4 shrink-0 rounded border border-gray-300 dark:border-gray-600"
            style={ "background-color: " (color.to_css()) }
        {}
    }
}

/// An edit link followed by a delete button that asks for confirmation and
/// removes the element matched by `target` from the page on success.
///
/// Pass an empty `edit_url` to only render the delete button.
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    target: &str,
    swap: &str,
) -> Markup {
    html! {
        @if !edit_url.is_empty() {
            a href=(edit_url) class=(LINK_STYLE) { "Edit" }
        }

        button
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(target)
            hx-target-error="#alert-container"
            hx-swap=(swap)
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}
