//! Message definitions for the broker
//!
//! `Message` is what publishers hand in and what subscribers and `fetch`
//! hand back. The broker never mutates it after publish; every delivery is
//! a clone.
//!
//! Notes on fields:
//! - `payload`: opaque body, the broker does not interpret it
//! - `expiration`: time-to-live counted from the moment of publish, not an
//!   absolute deadline

use std::time::Duration;

use tokio::time::Instant;

/// Broker-wide identifier handed out by `publish`.
pub type MessageId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub payload: String,
    pub expiration: Duration,
}

impl Message {
    pub fn new(payload: impl Into<String>, expiration: Duration) -> Self {
        Self {
            payload: payload.into(),
            expiration,
        }
    }
}

/// A message as retained by the broker after publish.
#[derive(Debug, Clone)]
pub struct PublishedRecord {
    pub id: MessageId,
    pub message: Message,
    pub created_at: Instant,
}

impl PublishedRecord {
    pub fn new(id: MessageId, message: Message, created_at: Instant) -> Self {
        Self {
            id,
            message,
            created_at,
        }
    }

    /// A record is expired at or after `created_at + expiration`. A deadline
    /// that does not fit in an `Instant` never arrives.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.created_at.checked_add(self.message.expiration) {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}
