//! # RealBroker
//!
//! `realbroker` is an in-process message broker: subject-based
//! publish/subscribe, point-in-time retrieval of published messages by
//! identifier, and time-to-live expiration.
//!
//! ## Core Modules
//!
//! - `broker`: the broker state machine (subjects, subscriber fan-out,
//!   retention with expiration, identifier allocation, open → closed
//!   lifecycle) and the `MessageBroker` trait every broker implements.
//! - `instrumented`: a `MessageBroker` wrapper recording Prometheus metrics
//!   and structured logs around each call.
//! - `config`: layered loading of broker, logging and metrics settings.
//! - `utils`: the shared error type and logging setup.
//!
//! Delivery to subscribers is at-most-once: a subscriber whose buffer is full
//! misses messages instead of slowing the publisher down.

pub mod broker;
pub mod config;
pub mod instrumented;
pub mod utils;

pub use broker::{Broker, Message, MessageBroker, MessageId, Subscription};
pub use instrumented::{BrokerMetrics, Instrumented};
pub use utils::error::{BrokerError, Result};
