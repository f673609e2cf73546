//! Metrics and logging around any [`MessageBroker`].
//!
//! [`Instrumented`] is itself a `MessageBroker`: it forwards every call to
//! the wrapped broker unchanged and records, per call, its duration, its
//! outcome and one structured log event. Errors are classified, never masked
//! or translated.
//!
//! ```ignore
//! let broker = Instrumented::new(Broker::new(), BrokerMetrics::new("broker_service")?);
//! ```

pub mod metrics;

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::broker::{Message, MessageBroker, MessageId, Subscription};
use crate::utils::error::{BrokerError, Result};

pub use metrics::BrokerMetrics;

pub struct Instrumented<B> {
    inner: B,
    metrics: BrokerMetrics,
}

impl<B> Instrumented<B> {
    pub fn new(inner: B, metrics: BrokerMetrics) -> Self {
        Self { inner, metrics }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    pub fn metrics(&self) -> &BrokerMetrics {
        &self.metrics
    }

    fn observe<T>(&self, method: &'static str, start: Instant, result: &Result<T>) {
        self.metrics
            .record_call(method, result.is_ok(), start.elapsed().as_secs_f64());
    }
}

fn log_failure(method: &'static str, subject: &str, id: Option<MessageId>, err: &BrokerError) {
    match err {
        BrokerError::Cancelled => {
            warn!(method, subject, ?id, error = %err, kind = err.kind(), "call cancelled")
        }
        _ => error!(method, subject, ?id, error = %err, kind = err.kind(), "call failed"),
    }
}

impl<B: MessageBroker> MessageBroker for Instrumented<B> {
    fn publish(&self, ctx: &CancellationToken, subject: &str, message: Message) -> Result<MessageId> {
        let start = Instant::now();
        let result = self.inner.publish(ctx, subject, message);
        self.observe("publish", start, &result);

        match &result {
            Ok(id) => info!(method = "publish", subject, id, "message published"),
            Err(err) => log_failure("publish", subject, None, err),
        }
        result
    }

    fn subscribe(&self, ctx: &CancellationToken, subject: &str) -> Result<Subscription> {
        let gauge = self.metrics.active_subscribers_gauge().clone();
        gauge.inc();

        let start = Instant::now();
        let result = self.inner.subscribe(ctx, subject);
        self.observe("subscribe", start, &result);

        match result {
            Ok(subscription) => {
                info!(method = "subscribe", subject, "subscribed to subject");
                Ok(subscription.with_drop_hook(move || gauge.dec()))
            }
            Err(err) => {
                gauge.dec();
                log_failure("subscribe", subject, None, &err);
                Err(err)
            }
        }
    }

    fn fetch(&self, ctx: &CancellationToken, subject: &str, id: MessageId) -> Result<Message> {
        let start = Instant::now();
        let result = self.inner.fetch(ctx, subject, id);
        self.observe("fetch", start, &result);

        match &result {
            Ok(_) => info!(method = "fetch", subject, id, "message fetched"),
            Err(err) => log_failure("fetch", subject, Some(id), err),
        }
        result
    }

    fn close(&self, ctx: &CancellationToken) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.close(ctx);
        self.observe("close", start, &result);

        match &result {
            Ok(()) => info!(method = "close", "broker closed"),
            Err(BrokerError::Cancelled) => warn!(method = "close", "call cancelled"),
            Err(err) => error!(method = "close", error = %err, kind = err.kind(), "call failed"),
        }
        result
    }
}
