//! Broker engine
//!
//! This module contains the in-memory broker implementation responsible for:
//! - keeping one registry of subjects, each with its subscribers and records
//! - allocating identifiers from a single counter shared by every subject
//! - fanning published messages out to subscribers without ever blocking
//! - answering point-in-time lookups with lazy, read-time expiration
//! - the one-way open → closed lifecycle
//!
//! Concurrency and usage notes:
//! - All state lives behind one `RwLock`. `publish`, `subscribe`, `close`
//!   and the expiry sweep take the write side, `fetch` and the inspection
//!   helpers take the read side. The closed flag is only ever read under the
//!   lock, so no send can race with the channel teardown in `close`.
//! - Delivery is at-most-once. A subscriber whose buffer is full simply
//!   misses the message; the publisher is never slowed down by it and the
//!   other subscribers are not affected.
//! - Expired records are not evicted by reads. They stay in memory until
//!   `purge_expired` runs, either called directly or from `run_sweeper`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::broker::MessageBroker;
use crate::broker::message::{Message, MessageId, PublishedRecord};
use crate::broker::subject::Subject;
use crate::broker::subscription::Subscription;
use crate::config::BrokerSettings;
use crate::utils::error::{BrokerError, Result};

#[derive(Debug, Default)]
struct State {
    subjects: HashMap<String, Subject>,
    last_id: MessageId,
    closed: bool,
}

impl State {
    fn subject_mut(&mut self, name: &str) -> &mut Subject {
        self.subjects
            .entry(name.to_string())
            .or_insert_with(|| Subject::new(name))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(BrokerError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug)]
pub struct Broker {
    state: RwLock<State>,
    subscriber_capacity: usize,
}

impl Broker {
    /// Buffer size of each subscription when none is configured. Large
    /// enough to absorb a reasonable burst from a single publisher.
    pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 50;
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_SUBSCRIBER_CAPACITY)
    }

    /// Create a broker whose subscriptions buffer up to `subscriber_capacity`
    /// messages. Zero is raised to one.
    pub fn with_capacity(subscriber_capacity: usize) -> Self {
        Self {
            state: RwLock::new(State::default()),
            subscriber_capacity: subscriber_capacity.max(1),
        }
    }

    pub fn from_settings(settings: &BrokerSettings) -> Self {
        Self::with_capacity(settings.subscriber_capacity)
    }

    pub fn subscriber_capacity(&self) -> usize {
        self.subscriber_capacity
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Live subscriptions registered on `subject`.
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.state
            .read()
            .subjects
            .get(subject)
            .map_or(0, Subject::subscriber_count)
    }

    /// Records still holding their payload across all subjects, expired or
    /// not.
    pub fn retained_len(&self) -> usize {
        self.state
            .read()
            .subjects
            .values()
            .map(Subject::retained_len)
            .sum()
    }

    /// Remove the payload of every expired record. Fetching a purged id still
    /// reports `ExpiredIdentifier`.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut state = self.state.write();
        state.ensure_open()?;

        let now = Instant::now();
        let removed: usize = state
            .subjects
            .values_mut()
            .map(|subject| subject.purge_expired(now))
            .sum();

        if removed > 0 {
            debug!(removed, "purged expired records");
        }
        Ok(removed)
    }

    /// Periodically run `purge_expired` until `shutdown` fires or the broker
    /// closes. Meant to be spawned as a background task.
    pub async fn run_sweeper(broker: Arc<Broker>, period: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("expiry sweeper stopped by shutdown signal");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(BrokerError::Unavailable) = broker.purge_expired() {
                        debug!("broker closed, expiry sweeper exiting");
                        return;
                    }
                }
            }
        }
    }
}

fn check_cancelled(ctx: &CancellationToken) -> Result<()> {
    if ctx.is_cancelled() {
        Err(BrokerError::Cancelled)
    } else {
        Ok(())
    }
}

impl MessageBroker for Broker {
    fn publish(&self, ctx: &CancellationToken, subject: &str, message: Message) -> Result<MessageId> {
        check_cancelled(ctx)?;

        let mut state = self.state.write();
        state.ensure_open()?;

        state.last_id += 1;
        let id = state.last_id;

        let target = state.subject_mut(subject);
        target.deliver(&message);
        target.store(PublishedRecord::new(id, message, Instant::now()));

        Ok(id)
    }

    fn subscribe(&self, ctx: &CancellationToken, subject: &str) -> Result<Subscription> {
        check_cancelled(ctx)?;

        let mut state = self.state.write();
        state.ensure_open()?;

        let (sender, receiver) = mpsc::channel(self.subscriber_capacity);
        state.subject_mut(subject).subscribe(sender);

        Ok(Subscription::new(subject, receiver))
    }

    fn fetch(&self, ctx: &CancellationToken, subject: &str, id: MessageId) -> Result<Message> {
        check_cancelled(ctx)?;

        let state = self.state.read();
        state.ensure_open()?;

        match state.subjects.get(subject) {
            Some(target) => target.fetch(id, Instant::now()),
            None => Err(BrokerError::InvalidIdentifier),
        }
    }

    fn close(&self, ctx: &CancellationToken) -> Result<()> {
        check_cancelled(ctx)?;

        let mut state = self.state.write();
        state.ensure_open()?;

        state.closed = true;
        for subject in state.subjects.values_mut() {
            subject.close_subscribers();
        }

        info!(subjects = state.subjects.len(), "broker closed");
        Ok(())
    }
}
