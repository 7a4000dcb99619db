use futures::stream::BoxStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::dao::models::{ChangeEvent, EventFilter};

const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out of store change events.
///
/// A subscriber that falls behind the buffer has its stream closed; it is
/// expected to subscribe again and re-fetch a snapshot.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed buffering up to `capacity` undelivered events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Deliver an event to all current subscribers, ignoring the no-subscriber case.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    /// Open a filtered event stream starting at the next published event.
    pub fn subscribe(&self, filter: EventFilter) -> BoxStream<'static, ChangeEvent> {
        let mut receiver = self.sender.subscribe();
        Box::pin(async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if filter.accepts(&event) {
                            yield event;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "change feed subscriber lagged; closing stream for resync");
                        break;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
