//! WebSocket room channel adapter.

mod client;

pub use client::WebSocketTransport;
