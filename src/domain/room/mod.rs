//! Room domain - the message log and the events that mutate it.
//!
//! # Module Organization
//!
//! - `message` - log entries (`ChatMessage`) and sender roles
//! - `event` - the `add`/`update`/`all` wire union and its validation
//! - `log` - `RoomLog`, the reconciler that keeps a client's view of a
//!   room consistent with the authoritative log

mod event;
mod log;
mod message;

pub use event::{Event, EventValidationError, Snapshot, WireMessage};
pub use log::{Applied, RoomLog};
pub use message::{ChatMessage, Role};
