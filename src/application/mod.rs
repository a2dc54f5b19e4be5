//! Application layer - Session orchestration and user intents.
//!
//! This layer ties a room's local log to a transport connection and
//! turns raw user input into wire events. Presentation (rendering,
//! input handling) stays outside; it reads the reconciled message list
//! and calls the submit entry points.

mod compose_message;
mod identity;
mod session;

pub use compose_message::{MessageComposer, SubmitError};
pub use identity::ClientIdentity;
pub use session::{EditError, RoomSession};
