//! `channel` crate — HTTP transport for the trace adapter.
//!
//! [`HttpTransport`] opens a fresh [`HttpChannel`] per trace; each channel
//! POSTs one JSON body and can be cancelled from another task.

pub mod config;
pub mod http;

pub use config::ChannelConfig;
pub use http::{HttpChannel, HttpTransport};

#[cfg(test)]
mod http_tests;
