//! Receive side of a subscription.
//!
//! A `Subscription` is a live, lazy stream of the messages published to one
//! subject after it was created. It ends (yields `None`) once the broker is
//! closed and whatever was already buffered has been read. It cannot be
//! restarted; subscribe again for a fresh, empty-backlog stream.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::broker::message::Message;

type DropHook = Box<dyn FnOnce() + Send + Sync>;

pub struct Subscription {
    subject: String,
    receiver: mpsc::Receiver<Message>,
    on_drop: Option<DropHook>,
}

impl Subscription {
    pub(crate) fn new(subject: &str, receiver: mpsc::Receiver<Message>) -> Self {
        Self {
            subject: subject.to_string(),
            receiver,
            on_drop: None,
        }
    }

    /// Subject this subscription was registered on.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Wait for the next message. `None` means the broker closed.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for use outside an async
    /// runtime. Panics if called from within one, like
    /// `tokio::sync::mpsc::Receiver::blocking_recv`.
    pub fn blocking_recv(&mut self) -> Option<Message> {
        self.receiver.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Result<Message, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Number of messages buffered and not yet read.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Attach a callback run once when this handle is dropped. Wrapping
    /// layers use it to track how long subscriptions live.
    pub fn with_drop_hook(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        let previous = self.on_drop.take();
        self.on_drop = Some(Box::new(move || {
            if let Some(previous) = previous {
                previous();
            }
            hook();
        }));
        self
    }
}

impl Stream for Subscription {
    type Item = Message;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Message>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hook) = self.on_drop.take() {
            hook();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subject", &self.subject)
            .field("buffered", &self.receiver.len())
            .finish()
    }
}
