//! Core of the chat-bot webhook notifier.
//!
//! Provider crates (Feishu, WeCom) own their wire types and URL layout; this
//! crate owns everything they share: errors, call context, client options,
//! the JSON-over-HTTP round trip and the `Notifier` port.

pub mod config;
pub mod context;
pub mod errors;
pub mod logging;
pub mod options;
pub mod ports;
pub mod webhook;

pub use context::Context;
pub use errors::{Error, Result, TransportError};
pub use options::ClientOptions;
pub use ports::{Notifier, NotifierCapabilities, Provider};
pub use webhook::{ResponseEnvelope, WebhookClient};

pub use tokio_util::sync::CancellationToken;
