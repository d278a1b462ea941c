//! The form shared by the create and edit card pages.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    card::{Card, CardDraft, CardId, CardType, Expiry},
    color::Color,
    endpoints,
    form_input::parse_limit,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_COLOR_INPUT_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
};

/// How many years ahead of the current year a card can expire.
const EXPIRY_YEARS_AHEAD: i32 = 20;

/// The fields submitted by the card form.
#[derive(Debug, Clone, Deserialize)]
pub struct CardFormData {
    pub name: String,
    pub number: String,
    /// The credit limit as typed, text that is not a whole number is read as zero.
    pub limit: String,
    pub card_type: String,
    pub month: u8,
    pub year: i32,
    /// The display color as `#rrggbb`.
    pub color: String,
}

impl CardFormData {
    /// Convert the submitted fields into a card draft.
    ///
    /// Pass `id` to update an existing card.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCardType] if the card type is not supported,
    /// - [Error::InvalidExpiryMonth] if the month is not from 1 to 12,
    /// - [Error::InvalidExpiryYear] if the year does not have four digits,
    /// - or [Error::InvalidColor] if the color is not a hex color.
    pub fn into_draft(self, id: Option<CardId>) -> Result<CardDraft, Error> {
        Ok(CardDraft {
            id,
            name: self.name.trim().to_owned(),
            number: self.number.trim().to_owned(),
            card_type: self.card_type.parse()?,
            limit: parse_limit(&self.limit),
            expiry: Expiry::new(self.month, self.year)?,
            color: Color::from_hex(&self.color)?,
        })
    }
}

/// Check that a new card has not already expired.
///
/// # Errors
/// Returns [Error::ExpiredCard] if `year` is before `current_year`.
pub(crate) fn check_not_expired(year: i32, current_year: i32) -> Result<(), Error> {
    if year < current_year {
        return Err(Error::ExpiredCard { year, current_year });
    }

    Ok(())
}

/// Where the card form sends its data and which values it starts with.
pub(crate) struct CardFormConfig<'a> {
    /// The card being edited, or `None` for a new card.
    pub card: Option<&'a Card>,
    pub current_year: i32,
}

pub(crate) fn card_form_view(config: CardFormConfig) -> Markup {
    let CardFormConfig { card, current_year } = config;

    let (hx_post, hx_put) = match card {
        Some(card) => (
            None,
            Some(endpoints::format_endpoint(endpoints::PUT_CARD, card.id)),
        ),
        None => (Some(endpoints::POST_CARD.to_owned()), None),
    };
    let cancel_url = match card {
        Some(card) => endpoints::format_endpoint(endpoints::CARD_VIEW, card.id),
        None => endpoints::CARDS_VIEW.to_owned(),
    };

    let name = card.map(|card| card.name.as_str()).unwrap_or_default();
    let number = card.map(|card| card.number.as_str()).unwrap_or_default();
    let limit = card.map(|card| card.limit.to_string()).unwrap_or_default();
    let selected_type = card.map(|card| card.card_type).unwrap_or(CardType::Visa);
    let selected_month = card.map(|card| card.expiry.month()).unwrap_or(1);
    let selected_year = card.map(|card| card.expiry.year()).unwrap_or(current_year);
    let color = card.map(|card| card.color).unwrap_or(Color::BLUE);

    // An existing card may already have expired, keep its year selectable.
    let first_year = selected_year.min(current_year);
    let years = first_year..current_year + EXPIRY_YEARS_AHEAD;
    let submit_text = if card.is_some() { "Save" } else { "Create Card" };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class="space-y-4"
            {
                legend class="text-lg font-semibold" { "Details" }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="Visa Gold"
                        required
                        autofocus
                        value=(name)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="number" class=(FORM_LABEL_STYLE) { "Card number" }

                    input
                        id="number"
                        type="text"
                        name="number"
                        inputmode="numeric"
                        value=(number)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="limit" class=(FORM_LABEL_STYLE) { "Credit limit" }

                    input
                        id="limit"
                        type="text"
                        name="limit"
                        inputmode="numeric"
                        placeholder="0"
                        value=(limit)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="card_type" class=(FORM_LABEL_STYLE) { "Type" }

                    select id="card_type" name="card_type" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for card_type in CardType::ALL {
                            option value=(card_type) selected[card_type == selected_type]
                            {
                                (card_type)
                            }
                        }
                    }
                }
            }

            fieldset class="grid grid-cols-2 gap-4"
            {
                legend class="text-lg font-semibold" { "Expires" }

                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                    select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for month in 1..=12u8 {
                            option value=(month) selected[month == selected_month] { (month) }
                        }
                    }
                }

                div
                {
                    label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                    select id="year" name="year" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for year in years {
                            option value=(year) selected[year == selected_year] { (year) }
                        }
                    }
                }
            }

            div
            {
                label for="color" class=(FORM_LABEL_STYLE) { "Color" }

                input
                    id="color"
                    type="color"
                    name="color"
                    value=(color.to_hex())
                    class=(FORM_COLOR_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }

            a href=(cancel_url) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
        }
    }
}
