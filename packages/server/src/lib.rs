//! Real-time chat relay library.
//!
//! This library provides the connection hub, the per-connection actor and the
//! HTTP/WebSocket surface of the Tsudoi chat relay.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
