//! The `utils` module provides the definitions shared across `realbroker`:
//! the broker error type and logging setup.

pub mod error;
pub mod logging;
