pub mod engine;
pub mod message;
pub mod subject;
pub mod subscription;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub use engine::Broker;
pub use message::{Message, MessageId, PublishedRecord};
pub use subscription::Subscription;

use crate::utils::error::Result;

/// The four operations every broker offers.
///
/// The core [`Broker`] implements it, and so do layers that wrap a broker
/// (see [`Instrumented`](crate::instrumented::Instrumented)), so wrappers
/// compose freely. Every call is synchronous; `ctx` is checked before the
/// call takes effect and a cancelled token yields `BrokerError::Cancelled`.
pub trait MessageBroker: Send + Sync {
    /// Store `message` under `subject`, hand a copy to every current
    /// subscriber of that subject that has buffer room, and return the newly
    /// allocated broker-wide identifier.
    fn publish(&self, ctx: &CancellationToken, subject: &str, message: Message) -> Result<MessageId>;

    /// Register a new subscription on `subject`. Only messages published
    /// afterwards are delivered to it.
    fn subscribe(&self, ctx: &CancellationToken, subject: &str) -> Result<Subscription>;

    /// Return a copy of the message stored under (`subject`, `id`) if it has
    /// not expired yet.
    fn fetch(&self, ctx: &CancellationToken, subject: &str, id: MessageId) -> Result<Message>;

    /// Close the broker and end every subscription stream. Closing twice is
    /// an error (`Unavailable`), not a no-op.
    fn close(&self, ctx: &CancellationToken) -> Result<()>;
}

impl<T: MessageBroker + ?Sized> MessageBroker for Arc<T> {
    fn publish(&self, ctx: &CancellationToken, subject: &str, message: Message) -> Result<MessageId> {
        (**self).publish(ctx, subject, message)
    }

    fn subscribe(&self, ctx: &CancellationToken, subject: &str) -> Result<Subscription> {
        (**self).subscribe(ctx, subject)
    }

    fn fetch(&self, ctx: &CancellationToken, subject: &str, id: MessageId) -> Result<Message> {
        (**self).fetch(ctx, subject, id)
    }

    fn close(&self, ctx: &CancellationToken) -> Result<()> {
        (**self).close(ctx)
    }
}
