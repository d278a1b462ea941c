//! The persistent store for cards, transactions and categories.
//!
//! All writes go through a [UnitOfWork]: a batch of mutations that is
//! committed atomically. Dropping a unit of work without committing it
//! discards every mutation in the batch. Subscribers are told about the
//! changes in a batch only once it has been committed.

mod delete;
mod events;
mod policy;

use rusqlite::{Connection, Transaction as SqlTransaction};
use tokio::sync::broadcast;

use crate::{
    Error, card::CardId, category::CategoryId, db::initialize, transaction::TransactionId,
};

pub use events::StoreEvent;
pub use policy::{CardDeletion, CategoryDeletion, ReferentialPolicy};

use events::EVENT_CHANNEL_CAPACITY;

/// An entity that can be written to the store.
pub trait Persist {
    /// The stored entity returned after a successful write.
    type Saved;

    /// Insert or update the entity using `connection`.
    ///
    /// Returns the stored entity and the event to publish once the write is committed.
    fn persist(self, connection: &Connection) -> Result<(Self::Saved, StoreEvent), Error>;
}

/// A reference to a stored entity, used for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// A card and, depending on the policy, its transactions.
    Card(CardId),
    /// A category and, depending on the policy, the transactions tagged with it.
    Category(CategoryId),
    /// A single transaction.
    Transaction(TransactionId),
}

/// The single owner of the application's database.
///
/// Share it between request handlers behind an `Arc<Mutex<Store>>`.
#[derive(Debug)]
pub struct Store {
    connection: Connection,
    policy: ReferentialPolicy,
    events: broadcast::Sender<StoreEvent>,
}

impl Store {
    /// Create a store on `connection`, creating the tables if needed.
    ///
    /// `policy` decides what happens to transactions when the card or
    /// category they refer to is deleted.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(connection: Connection, policy: ReferentialPolicy) -> Result<Self, Error> {
        initialize(&connection)?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            connection,
            policy,
            events,
        })
    }

    /// The connection for read-only queries.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// The referential policy applied on deletion.
    pub fn policy(&self) -> ReferentialPolicy {
        self.policy
    }

    /// Receive an event for each committed change made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// A handle for subscribing to store events without holding the store.
    pub fn event_sender(&self) -> broadcast::Sender<StoreEvent> {
        self.events.clone()
    }

    /// Start a batch of mutations.
    ///
    /// # Errors
    /// Returns an error if a database transaction cannot be started.
    pub fn begin(&mut self) -> Result<UnitOfWork<'_>, Error> {
        let transaction = self.connection.transaction()?;

        Ok(UnitOfWork {
            transaction,
            policy: self.policy,
            events: &self.events,
            pending: Vec::new(),
        })
    }

    /// Save a single entity in its own batch.
    ///
    /// # Errors
    /// Returns the error from [Persist::persist], or an SQL error if the batch
    /// cannot be committed.
    pub fn save<E: Persist>(&mut self, entity: E) -> Result<E::Saved, Error> {
        let mut work = self.begin()?;
        let saved = work.save(entity)?;
        work.commit()?;

        Ok(saved)
    }

    /// Delete a single entity in its own batch.
    ///
    /// # Errors
    /// See [UnitOfWork::delete].
    pub fn delete(&mut self, entity: EntityRef) -> Result<(), Error> {
        let mut work = self.begin()?;
        work.delete(entity)?;
        work.commit()
    }
}

/// A batch of store mutations that is applied atomically by [UnitOfWork::commit].
///
/// A failed mutation leaves the rest of the batch untouched.
pub struct UnitOfWork<'a> {
    transaction: SqlTransaction<'a>,
    policy: ReferentialPolicy,
    events: &'a broadcast::Sender<StoreEvent>,
    pending: Vec<StoreEvent>,
}

impl UnitOfWork<'_> {
    /// Insert a new entity or update an existing one.
    ///
    /// # Errors
    /// Returns the error from [Persist::persist].
    pub fn save<E: Persist>(&mut self, entity: E) -> Result<E::Saved, Error> {
        let savepoint = self.transaction.savepoint()?;
        let (saved, event) = entity.persist(&savepoint)?;
        savepoint.commit()?;

        self.pending.push(event);

        Ok(saved)
    }

    /// Delete an entity, applying the store's referential policy.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingCard], [Error::DeleteMissingCategory] or
    ///   [Error::DeleteMissingTransaction] if the entity does not exist,
    /// - [Error::DeleteRestricted] if the policy forbids the deletion,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn delete(&mut self, entity: EntityRef) -> Result<(), Error> {
        let savepoint = self.transaction.savepoint()?;
        let events = match entity {
            EntityRef::Card(card_id) => delete::delete_card(card_id, self.policy.card, &savepoint)?,
            EntityRef::Category(category_id) => {
                delete::delete_category(category_id, self.policy.category, &savepoint)?
            }
            EntityRef::Transaction(transaction_id) => {
                delete::delete_transaction(transaction_id, &savepoint)?
            }
        };
        savepoint.commit()?;

        self.pending.extend(events);

        Ok(())
    }

    /// The connection for reading uncommitted changes in this batch.
    pub fn connection(&self) -> &Connection {
        &self.transaction
    }

    /// Commit the batch and notify subscribers of each change, in the order the changes were made.
    ///
    /// # Errors
    /// Returns an error if the database transaction cannot be committed, in
    /// which case no events are published.
    pub fn commit(self) -> Result<(), Error> {
        self.transaction.commit()?;

        for event in self.pending {
            tracing::debug!("Publishing store event {event}");
            // Sending only fails when nobody is subscribed.
            let _ = self.events.send(event);
        }

        Ok(())
    }
}
