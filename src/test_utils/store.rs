use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Date;

use crate::{
    card::{Card, CardDraft, CardType, Expiry},
    category::{Category, CategoryDraft, CategoryId, CategoryName},
    color::Color,
    store::{ReferentialPolicy, Store},
    transaction::{CardTransaction, TransactionDraft},
};

#[track_caller]
pub(crate) fn must_create_test_store() -> Arc<Mutex<Store>> {
    must_create_test_store_with_policy(ReferentialPolicy::default())
}

#[track_caller]
pub(crate) fn must_create_test_store_with_policy(policy: ReferentialPolicy) -> Arc<Mutex<Store>> {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let store = Store::new(connection, policy).expect("Could not create test store");

    Arc::new(Mutex::new(store))
}

#[track_caller]
pub(crate) fn must_create_card(name: &str, store: &Mutex<Store>) -> Card {
    store
        .lock()
        .unwrap()
        .save(CardDraft {
            id: None,
            name: name.to_owned(),
            number: "4111 1111 1111 1111".to_owned(),
            card_type: CardType::Visa,
            limit: 5000,
            expiry: Expiry::new(12, 2030).unwrap(),
            color: Color::BLUE,
        })
        .expect("Could not create test card")
}

#[track_caller]
pub(crate) fn must_create_category(name: &str, store: &Mutex<Store>) -> Category {
    store
        .lock()
        .unwrap()
        .save(CategoryDraft::new(
            CategoryName::new_unchecked(name),
            Color::RED,
        ))
        .expect("Could not create test category")
}

#[track_caller]
pub(crate) fn must_create_transaction(
    card: &Card,
    amount: f64,
    date: Date,
    categories: &[CategoryId],
    store: &Mutex<Store>,
) -> CardTransaction {
    store
        .lock()
        .unwrap()
        .save(TransactionDraft {
            card_id: card.id,
            name: "Groceries run".to_owned(),
            amount,
            date,
            photo: None,
            categories: categories.to_vec(),
        })
        .expect("Could not create test transaction")
}
