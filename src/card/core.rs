//! Defines the card data model and its database table.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    color::Color,
    database_id::DatabaseId,
    store::{Persist, StoreEvent},
};

/// Database identifier for a card.
pub type CardId = DatabaseId;

// ============================================================================
// MODELS
// ============================================================================

/// The payment network of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// A Visa card.
    Visa,
    /// A Mastercard card.
    Mastercard,
    /// A Mir card.
    Mir,
}

impl CardType {
    /// Every card type in the order they are offered in forms.
    pub const ALL: [CardType; 3] = [CardType::Visa, CardType::Mastercard, CardType::Mir];

    /// The name used for the card type in forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Visa => "Visa",
            CardType::Mastercard => "Mastercard",
            CardType::Mir => "Mir",
        }
    }
}

impl FromStr for CardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardType::ALL
            .into_iter()
            .find(|card_type| card_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidCardType(s.to_owned()))
    }
}

impl Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for CardType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CardType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The month and year a card expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expiry {
    month: u8,
    year: i32,
}

impl Expiry {
    /// Create an expiration date.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::InvalidExpiryMonth] if `month` is not from 1 to 12,
    /// - or [Error::InvalidExpiryYear] if `year` does not have four digits.
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidExpiryMonth(month));
        }

        if !(1000..=9999).contains(&year) {
            return Err(Error::InvalidExpiryYear(year));
        }

        Ok(Self { month, year })
    }

    /// The month of the year, from 1 to 12.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The four digit year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Format as `MM/YY`, the way it is printed on the card.
    pub fn to_short_string(&self) -> String {
        format!("{:02}/{:02}", self.month, self.year.rem_euclid(100))
    }
}

/// A credit card that purchases are recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// The ID of the card.
    pub id: CardId,
    /// The name shown for the card, e.g. "Visa Gold".
    pub name: String,
    /// The card number. This is free text and is never validated.
    pub number: String,
    /// The payment network.
    pub card_type: CardType,
    /// The credit limit in whole units of currency.
    pub limit: i64,
    /// When the card expires.
    pub expiry: Expiry,
    /// When the card was first saved.
    pub created_at: OffsetDateTime,
    /// The color used to display the card.
    pub color: Color,
}

/// The unsaved state of a card.
///
/// A draft without an `id` creates a new card when saved, a draft with an `id`
/// overwrites that card and keeps its creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    /// The card to update, or `None` to create a new card.
    pub id: Option<CardId>,
    /// The name shown for the card.
    pub name: String,
    /// The card number.
    pub number: String,
    /// The payment network.
    pub card_type: CardType,
    /// The credit limit.
    pub limit: i64,
    /// When the card expires.
    pub expiry: Expiry,
    /// The color used to display the card.
    pub color: Color,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns read by [map_card_row], in order.
pub(crate) const CARD_COLUMNS: &str =
    "id, name, number, type, credit_limit, exp_month, exp_year, timestamp, color";

impl Persist for CardDraft {
    type Saved = Card;

    fn persist(self, connection: &Connection) -> Result<(Card, StoreEvent), Error> {
        let card = match self.id {
            None => insert_card(&self, connection)?,
            Some(id) => update_card(id, &self, connection)?,
        };

        Ok((card.clone(), StoreEvent::CardSaved(card.id)))
    }
}

fn insert_card(draft: &CardDraft, connection: &Connection) -> Result<Card, Error> {
    let card = connection
        .prepare(&format!(
            "INSERT INTO card (name, number, type, credit_limit, exp_month, exp_year, timestamp, color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {CARD_COLUMNS}"
        ))?
        .query_row(
            (
                &draft.name,
                &draft.number,
                draft.card_type,
                draft.limit,
                draft.expiry.month(),
                draft.expiry.year(),
                OffsetDateTime::now_utc(),
                draft.color.encode(),
            ),
            map_card_row,
        )?;

    Ok(card)
}

fn update_card(id: CardId, draft: &CardDraft, connection: &Connection) -> Result<Card, Error> {
    connection
        .prepare(&format!(
            "UPDATE card
             SET name = ?1, number = ?2, type = ?3, credit_limit = ?4,
                 exp_month = ?5, exp_year = ?6, color = ?7
             WHERE id = ?8
             RETURNING {CARD_COLUMNS}"
        ))?
        .query_row(
            (
                &draft.name,
                &draft.number,
                draft.card_type,
                draft.limit,
                draft.expiry.month(),
                draft.expiry.year(),
                draft.color.encode(),
                id,
            ),
            map_card_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingCard,
            error => error.into(),
        })
}

/// Create the card table.
///
/// IDs are never reused so that transactions left behind by a deleted card
/// cannot be picked up by a new card.
pub fn create_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS card (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            number TEXT NOT NULL,
            type TEXT NOT NULL,
            credit_limit INTEGER NOT NULL,
            exp_month INTEGER NOT NULL CHECK (exp_month BETWEEN 1 AND 12),
            exp_year INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            color BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_card_timestamp ON card(timestamp);",
    )?;

    Ok(())
}

/// Map a row selected with [CARD_COLUMNS] to a [Card].
///
/// A color that cannot be decoded is replaced with [Color::PURPLE].
pub fn map_card_row(row: &Row) -> Result<Card, rusqlite::Error> {
    let month: u8 = row.get(5)?;
    let year = row.get(6)?;
    let expiry = Expiry::new(month, year).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Integer, Box::new(error))
    })?;
    let color: Vec<u8> = row.get(8)?;

    Ok(Card {
        id: row.get(0)?,
        name: row.get(1)?,
        number: row.get(2)?,
        card_type: row.get(3)?,
        limit: row.get(4)?,
        expiry,
        created_at: row.get(7)?,
        color: Color::decode_or(&color, Color::PURPLE),
    })
}

#[cfg(test)]
mod card_type_tests {
    use crate::Error;

    use super::CardType;

    #[test]
    fn parses_every_card_type() {
        for card_type in CardType::ALL {
            assert_eq!(card_type.as_str().parse(), Ok(card_type));
        }
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!("mastercard".parse(), Ok(CardType::Mastercard));
        assert_eq!("MIR".parse(), Ok(CardType::Mir));
    }

    #[test]
    fn rejects_unknown_card_type() {
        assert_eq!(
            "Amex".parse::<CardType>(),
            Err(Error::InvalidCardType("Amex".to_owned()))
        );
    }
}

#[cfg(test)]
mod expiry_tests {
    use crate::Error;

    use super::Expiry;

    #[test]
    fn accepts_every_month() {
        for month in 1..=12 {
            assert!(Expiry::new(month, 2030).is_ok(), "want month {month} to be valid");
        }
    }

    #[test]
    fn rejects_months_outside_of_year() {
        assert_eq!(Expiry::new(0, 2030), Err(Error::InvalidExpiryMonth(0)));
        assert_eq!(Expiry::new(13, 2030), Err(Error::InvalidExpiryMonth(13)));
    }

    #[test]
    fn rejects_years_without_four_digits() {
        for year in [-2030, 0, 5, 999, 10_000, 123_456] {
            assert_eq!(Expiry::new(6, year), Err(Error::InvalidExpiryYear(year)));
        }

        assert!(Expiry::new(6, 1000).is_ok());
        assert!(Expiry::new(6, 9999).is_ok());
    }

    #[test]
    fn short_string_pads_month_and_year() {
        assert_eq!(Expiry::new(3, 2030).unwrap().to_short_string(), "03/30");
        assert_eq!(Expiry::new(12, 2105).unwrap().to_short_string(), "12/05");
    }
}
