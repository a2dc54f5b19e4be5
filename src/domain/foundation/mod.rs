//! Foundation module - Shared domain primitives.
//!
//! Contains the identifier and timestamp value objects that form the
//! vocabulary of the room synchronization domain.

mod ids;
mod timestamp;

pub use ids::{MessageId, RoomId};
pub use timestamp::Timestamp;
