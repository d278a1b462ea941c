//! Streams store changes to the browser so open pages can refresh themselves.

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{FromRef, State},
    response::sse::{Event, KeepAlive, Sse},
};
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{AppState, store::StoreEvent};

/// The name of the server-sent event emitted after each committed change.
pub(crate) const STORE_CHANGED_EVENT: &str = "store-changed";

/// The state needed for the store events stream.
#[derive(Debug, Clone)]
pub struct StoreEventsState {
    pub store_events: broadcast::Sender<StoreEvent>,
}

impl FromRef<AppState> for StoreEventsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store_events: state.store_events.clone(),
        }
    }
}

/// Stream a `store-changed` event for every committed change to the store.
///
/// The event data names the change, e.g. "card-saved:3". A subscriber that
/// falls too far behind gets a single `store-changed` event with the data
/// "lagged" instead of the events it missed.
pub async fn get_store_events(
    State(state): State<StoreEventsState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = store_event_stream(state.store_events.subscribe());

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

fn store_event_stream(
    receiver: broadcast::Receiver<StoreEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(receiver).map(|maybe_event| {
        let data = match maybe_event {
            Ok(event) => event.to_string(),
            Err(error) => {
                tracing::warn!("Store event subscriber fell behind: {error}");
                "lagged".to_owned()
            }
        };

        Ok(Event::default().event(STORE_CHANGED_EVENT).data(data))
    })
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;
    use tokio_stream::StreamExt;

    use crate::store::StoreEvent;

    use super::store_event_stream;

    #[tokio::test]
    async fn emits_one_event_per_store_change() {
        let (sender, receiver) = broadcast::channel(4);
        let mut stream = Box::pin(store_event_stream(receiver));

        sender.send(StoreEvent::CardSaved(1)).unwrap();
        sender.send(StoreEvent::CategoryDeleted(2)).unwrap();
        drop(sender);

        let mut count = 0;
        while let Some(event) = stream.next().await {
            assert!(event.is_ok());
            count += 1;
        }

        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn lagging_subscriber_keeps_receiving() {
        let (sender, receiver) = broadcast::channel(1);
        let stream = Box::pin(store_event_stream(receiver));

        sender.send(StoreEvent::CardSaved(1)).unwrap();
        sender.send(StoreEvent::CardSaved(2)).unwrap();
        drop(sender);

        let events: Vec<_> = stream.collect().await;

        // One event for the lag, then the one event still in the channel.
        assert_eq!(events.len(), 2);
    }
}
