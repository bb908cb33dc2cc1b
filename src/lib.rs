//! Typed client for a payment gateway
//!
//! Builds payment request envelopes from a resolved [`ClientConfig`], sends
//! them with a bounded retry on lost connections, decodes the gateway's JSON
//! and classifies gateway-reported failures.

pub mod config;
pub mod error;
pub mod payments;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
