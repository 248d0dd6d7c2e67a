// lib.rs
//! Remote control for IrUsb infrared relays over telnet, plus a small
//! HTTP/WebSocket bridge that owns one remote per configured relay.

pub mod commands;
pub mod config;
pub mod devices;
pub mod docs;
pub mod error;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::Action;
pub use devices::{Device, IrUsbRemote};
pub use error::{AppError, TransportError};
pub use models::AppState;
pub use transport::{CommandSender, Endpoint, TelnetSender};
