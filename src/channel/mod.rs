//! Session channel client
//!
//! `ChannelClient` holds what the UI observes: connection state, the
//! translation log and the current error. `transport` keeps it attached to
//! the relay over a reconnecting WebSocket.

mod client;
mod transport;

pub use client::{ChannelClient, ChannelEvent, TranslationRecord, ERROR_DISPLAY_DURATION};
pub use transport::ReconnectPolicy;
