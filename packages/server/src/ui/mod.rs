//! WebSocket chat relay server.

pub mod connection;
mod handler;
mod server;
mod signal;
pub mod state;

pub use connection::ConnectionActor;
pub use server::Server;
pub use state::{AppState, HandlerSettings};
