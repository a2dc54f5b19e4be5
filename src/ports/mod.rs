//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `RoomTransport` - attach to a named room and exchange events with it

mod transport;

pub use transport::{RoomConnection, RoomTransport, TransportError};
