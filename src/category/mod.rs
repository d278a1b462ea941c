//! Categories for grouping card transactions.

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub(crate) use db::{CATEGORY_COLUMNS, map_category_row_with_offset};
pub use db::{create_category_table, map_category_row};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryDraft, CategoryFormData, CategoryId, CategoryName};
pub use list::get_categories_page;
