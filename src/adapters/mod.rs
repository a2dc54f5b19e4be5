//! Adapters - Implementations of the transport port.
//!
//! - `memory` - in-process loopback hub for tests and offline runs
//! - `websocket` - tokio-tungstenite client with automatic reconnection

pub mod memory;
pub mod websocket;

pub use memory::MemoryHub;
pub use websocket::WebSocketTransport;
