//! Turning raw user input into message entries.

use thiserror::Error;

use crate::domain::foundation::{MessageId, Timestamp};
use crate::domain::room::{ChatMessage, Role};

use super::identity::ClientIdentity;

/// Errors that can occur when composing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Submitted text is empty or whitespace only.
    #[error("message content cannot be empty")]
    EmptyContent,
}

/// Builds message entries on behalf of one client identity.
///
/// Composition happens before any server round-trip: the fresh id and
/// timestamp minted here are what the server later echoes back, which
/// is how the optimistic local entry and its echo are matched up.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    identity: ClientIdentity,
}

impl MessageComposer {
    pub fn new(identity: ClientIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Composes a new message from submitted text.
    ///
    /// Trims the text first; submissions that trim to nothing are
    /// rejected without minting an id.
    pub fn compose(&self, text: &str) -> Result<ChatMessage, SubmitError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(SubmitError::EmptyContent);
        }
        Ok(ChatMessage::new(
            MessageId::generate(),
            content,
            self.identity.display_name(),
            Role::User,
            Timestamp::now(),
        ))
    }

    /// Composes a replacement for an existing message.
    ///
    /// Keeps the original's id, sender and role; the timestamp is
    /// refreshed to the edit time.
    pub fn revise(&self, original: &ChatMessage, text: &str) -> Result<ChatMessage, SubmitError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(SubmitError::EmptyContent);
        }
        Ok(ChatMessage::new(
            original.id.clone(),
            content,
            original.user.clone(),
            original.role,
            Timestamp::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> MessageComposer {
        MessageComposer::new(ClientIdentity::named("Kapil"))
    }

    mod compose {
        use super::*;

        #[test]
        fn builds_a_user_message_with_fresh_id_and_time() {
            let before = Timestamp::now();
            let message = composer().compose("hello").unwrap();

            assert!(!message.id.is_empty());
            assert_eq!(message.content, "hello");
            assert_eq!(message.user, "Kapil");
            assert_eq!(message.role, Role::User);
            assert!(message.ts >= before);
        }

        #[test]
        fn trims_surrounding_whitespace() {
            let message = composer().compose("  hi there \n").unwrap();
            assert_eq!(message.content, "hi there");
        }

        #[test]
        fn rejects_empty_text() {
            assert_eq!(composer().compose(""), Err(SubmitError::EmptyContent));
        }

        #[test]
        fn rejects_whitespace_only_text() {
            assert_eq!(composer().compose("   \t"), Err(SubmitError::EmptyContent));
        }

        #[test]
        fn mints_a_distinct_id_per_message() {
            let composer = composer();
            let first = composer.compose("one").unwrap();
            let second = composer.compose("one").unwrap();
            assert_ne!(first.id, second.id);
        }
    }

    mod revise {
        use super::*;

        #[test]
        fn keeps_id_sender_and_role() {
            let original = composer().compose("draft").unwrap();
            let revised = composer().revise(&original, "final").unwrap();

            assert_eq!(revised.id, original.id);
            assert_eq!(revised.user, original.user);
            assert_eq!(revised.role, original.role);
            assert_eq!(revised.content, "final");
        }

        #[test]
        fn refreshes_the_timestamp() {
            let original = ChatMessage::new(
                MessageId::new("m1"),
                "draft",
                "Kapil",
                Role::User,
                Timestamp::from_millis(1),
            );
            let revised = composer().revise(&original, "final").unwrap();
            assert!(revised.ts > original.ts);
        }

        #[test]
        fn rejects_empty_replacement_text() {
            let original = composer().compose("draft").unwrap();
            assert_eq!(
                composer().revise(&original, "  "),
                Err(SubmitError::EmptyContent)
            );
        }
    }
}
