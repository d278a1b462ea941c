//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::{
    Error,
    store::{ReferentialPolicy, Store, StoreEvent},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,

    /// The store holding every card, transaction and category.
    pub store: Arc<Mutex<Store>>,

    /// Sends an event after each committed change to the store.
    pub store_events: broadcast::Sender<StoreEvent>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Europe/Moscow".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        policy: ReferentialPolicy,
    ) -> Result<Self, Error> {
        let store = Store::new(db_connection, policy)?;
        let store_events = store.event_sender();

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            store: Arc::new(Mutex::new(store)),
            store_events,
        })
    }
}
