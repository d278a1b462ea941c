//! Database operations for categories.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, CategoryDraft, CategoryId, CategoryName},
    color::Color,
    store::{Persist, StoreEvent},
};

/// The columns read by [map_category_row], in order.
pub(crate) const CATEGORY_COLUMNS: &str = "id, name, color, timestamp";

impl Persist for CategoryDraft {
    type Saved = Category;

    fn persist(self, connection: &Connection) -> Result<(Category, StoreEvent), Error> {
        let category = match self.id {
            None => insert_category(&self, connection)?,
            Some(id) => update_category(id, &self, connection)?,
        };

        Ok((category.clone(), StoreEvent::CategorySaved(category.id)))
    }
}

fn insert_category(draft: &CategoryDraft, connection: &Connection) -> Result<Category, Error> {
    let category = connection
        .prepare(&format!(
            "INSERT INTO category (name, color, timestamp) VALUES (?1, ?2, ?3)
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (
                draft.name.as_ref(),
                draft.color.encode(),
                OffsetDateTime::now_utc(),
            ),
            map_category_row,
        )?;

    Ok(category)
}

fn update_category(
    id: CategoryId,
    draft: &CategoryDraft,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "UPDATE category SET name = ?1, color = ?2 WHERE id = ?3
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (draft.name.as_ref(), draft.color.encode(), id),
            map_category_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingCategory,
            error => error.into(),
        })
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color BLOB NOT NULL,
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_timestamp ON category(timestamp);",
    )?;

    Ok(())
}

/// Map a row selected with [CATEGORY_COLUMNS], starting at `offset`, to a [Category].
pub(crate) fn map_category_row_with_offset(
    row: &Row,
    offset: usize,
) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(offset + 1)?;
    let color: Vec<u8> = row.get(offset + 2)?;

    Ok(Category {
        id: row.get(offset)?,
        name: CategoryName::new_unchecked(&raw_name),
        color: Color::decode_or(&color, Color::RED),
        created_at: row.get(offset + 3)?,
    })
}

/// Map a row selected with [CATEGORY_COLUMNS] to a [Category].
pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    map_category_row_with_offset(row, 0)
}
