//! Renders the list of a card's transactions.

use maud::{Markup, html};
use time::{Date, macros::format_description};

use crate::{
    endpoints::{self, format_endpoint},
    html::{category_badge, edit_delete_action_links, format_currency},
    transaction::CardTransaction,
};

/// The list of `transactions` in the given order, with a prompt to add the
/// first purchase when there are none.
pub fn transaction_list_view(transactions: &[CardTransaction]) -> Markup {
    html!(
        @if transactions.is_empty() {
            p class="text-center text-gray-500 dark:text-gray-400" data-empty-transactions="true"
            {
                "Add your first purchase"
            }
        } @else {
            ul class="space-y-4"
            {
                @for transaction in transactions {
                    (transaction_view(transaction))
                }
            }
        }
    )
}

fn transaction_view(transaction: &CardTransaction) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
    let confirm_message = if transaction.name.is_empty() {
        "Are you sure you want to delete this purchase?".to_owned()
    } else {
        format!(
            "Are you sure you want to delete the purchase '{}'?",
            transaction.name
        )
    };

    html!(
        li
            class="p-4 space-y-3 rounded-lg shadow-md bg-white dark:bg-gray-800"
            data-transaction-id=(transaction.id)
        {
            div class="flex justify-between gap-4"
            {
                div
                {
                    p class="font-semibold" { (transaction.name) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (format_date(transaction.date)) }
                }

                div class="text-right space-y-1"
                {
                    p class="font-semibold tabular-nums" data-amount="true"
                    {
                        (format_currency(transaction.amount))
                    }

                    (edit_delete_action_links(
                        "",
                        &delete_url,
                        &confirm_message,
                        "closest li",
                        "delete",
                    ))
                }
            }

            @if !transaction.categories.is_empty() {
                div class="flex flex-wrap gap-2"
                {
                    @for category in &transaction.categories {
                        (category_badge(category.name.as_ref(), category.color))
                    }
                }
            }

            @if transaction.has_photo {
                img
                    src=(format_endpoint(endpoints::TRANSACTION_PHOTO, transaction.id))
                    alt="Receipt"
                    loading="lazy"
                    class="receipt-photo";
            }
        }
    )
}

/// Format a purchase date, e.g., "14 Mar 2025".
fn format_date(date: Date) -> String {
    date.format(format_description!("[day padding:none] [month repr:short] [year]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        category::{Category, CategoryName},
        color::Color,
        transaction::CardTransaction,
    };

    use super::{format_date, transaction_list_view};

    fn transaction(id: i64, has_photo: bool) -> CardTransaction {
        CardTransaction {
            id,
            card_id: 1,
            name: "Bakery".to_owned(),
            amount: 42.5,
            date: date!(2025 - 03 - 14),
            has_photo,
            categories: vec![Category {
                id: 1,
                name: CategoryName::new_unchecked("Groceries"),
                color: Color::RED,
                created_at: time::OffsetDateTime::UNIX_EPOCH,
            }],
        }
    }

    fn render(transactions: &[CardTransaction]) -> Html {
        Html::parse_fragment(&transaction_list_view(transactions).into_string())
    }

    #[test]
    fn empty_list_prompts_for_first_purchase() {
        let html = render(&[]);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Add your first purchase"));
    }

    #[test]
    fn renders_transaction_details() {
        let html = render(&[transaction(7, false)]);

        let item = html
            .select(&Selector::parse("li[data-transaction-id='7']").unwrap())
            .next()
            .expect("No transaction found");
        let text = item.text().collect::<String>();
        assert!(text.contains("Bakery"));
        assert!(text.contains("14 Mar 2025"));
        assert!(text.contains("42.50 ₽"));
        assert!(text.contains("Groceries"));

        let delete = item
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .expect("No delete button found");
        assert_eq!(delete.value().attr("hx-delete"), Some("/api/transactions/7"));
        assert_eq!(item.select(&Selector::parse("img").unwrap()).count(), 0);
    }

    #[test]
    fn renders_photo_when_present() {
        let html = render(&[transaction(3, true)]);

        let img = html
            .select(&Selector::parse("img.receipt-photo").unwrap())
            .next()
            .expect("No photo found");
        assert_eq!(img.value().attr("src"), Some("/api/transactions/3/photo"));
    }

    #[test]
    fn formats_date_without_padding() {
        assert_eq!(format_date(date!(2025 - 01 - 05)), "5 Jan 2025");
    }
}
