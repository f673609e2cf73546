//! Subject management
//!
//! A `Subject` is one independent namespace of the broker: the senders of
//! every subscription registered on it, and the records published to it.
//! Subjects are created on first use and never removed while the broker is
//! open.
//!
//! Concurrency note: callers must synchronize access to `Subject` (the
//! broker keeps all subjects behind its single lock).

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::trace;

use crate::broker::message::{Message, MessageId, PublishedRecord};
use crate::utils::error::{BrokerError, Result};

#[derive(Debug, Default)]
pub struct Subject {
    pub name: String,
    subscribers: Vec<mpsc::Sender<Message>>,
    records: HashMap<MessageId, PublishedRecord>,
    purged: HashSet<MessageId>,
}

impl Subject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Register the sending side of a new subscription.
    pub fn subscribe(&mut self, sender: mpsc::Sender<Message>) {
        self.subscribers.push(sender);
    }

    /// Offer `message` to every subscriber without waiting. A full buffer
    /// drops the message for that subscriber only; a subscriber whose
    /// receiver is gone is removed.
    pub fn deliver(&mut self, message: &Message) {
        let name = &self.name;
        self.subscribers
            .retain(|sender| match sender.try_send(message.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    trace!(subject = %name, "subscriber buffer full, message dropped");
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(subject = %name, "subscriber gone, removing it");
                    false
                }
            });
    }

    pub fn store(&mut self, record: PublishedRecord) {
        self.records.insert(record.id, record);
    }

    /// Look up a record and check its retention window against `now`.
    pub fn fetch(&self, id: MessageId, now: Instant) -> Result<Message> {
        match self.records.get(&id) {
            Some(record) if record.is_expired(now) => Err(BrokerError::ExpiredIdentifier),
            Some(record) => Ok(record.message.clone()),
            None if self.purged.contains(&id) => Err(BrokerError::ExpiredIdentifier),
            None => Err(BrokerError::InvalidIdentifier),
        }
    }

    /// Drop the payload of every expired record, keeping its id as a
    /// tombstone. Returns how many records were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<MessageId> = self
            .records
            .values()
            .filter(|record| record.is_expired(now))
            .map(|record| record.id)
            .collect();

        for id in &expired {
            self.records.remove(id);
            self.purged.insert(*id);
        }
        expired.len()
    }

    /// Drop every sender so that receivers observe end-of-stream once their
    /// buffers are drained.
    pub fn close_subscribers(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn retained_len(&self) -> usize {
        self.records.len()
    }
}
