//! The local message log and its reconciliation rules.
//!
//! `RoomLog` is the client's view of a room: an ordered list of messages
//! kept consistent with the server's authoritative log by applying inbound
//! events. It is exclusively owned by a single session and mutated from a
//! single call path, so no interior locking is needed.

use tracing::debug;

use crate::domain::foundation::{MessageId, RoomId, Timestamp};
use crate::domain::room::{ChatMessage, Event, Snapshot, WireMessage};

/// What an applied event did to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new entry was appended at the tail.
    Appended,
    /// An existing entry was replaced in place.
    Replaced,
    /// The whole log was replaced by an authoritative snapshot.
    Reset,
}

/// Ordered message list for one room on one client.
///
/// Ordering is insertion order for appends and position-preserving for
/// updates; timestamps never influence it. Applying any event is total and
/// infallible, and preserves the invariant that no two entries share an id.
#[derive(Debug, Clone)]
pub struct RoomLog {
    room_id: RoomId,
    messages: Vec<ChatMessage>,
}

impl RoomLog {
    /// Creates an empty log for a room.
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            messages: Vec::new(),
        }
    }

    /// Returns the room this log belongs to.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns the messages in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Applies one inbound event.
    ///
    /// - `all` replaces the entire log with the snapshot (idempotent).
    /// - `add` upserts: an entry with the same id is replaced in place
    ///   (this absorbs the server echo of an optimistic append without
    ///   duplicating it); otherwise the message is appended at the tail.
    /// - `update` upserts identically: unknown ids degrade to an append
    ///   rather than dropping the content.
    ///
    /// On an id collision the incoming field values always win; arrival
    /// order decides, never `ts`.
    pub fn apply(&mut self, event: Event) -> Applied {
        let received_at = Timestamp::now();
        match event {
            Event::All(snapshot) => {
                self.messages.clear();
                for wire in snapshot.messages {
                    // Snapshots from a well-behaved server carry unique ids;
                    // merging entry by entry keeps the invariant even when
                    // they do not.
                    let message = wire.into_message(received_at);
                    match self.position(&message.id) {
                        Some(index) => self.messages[index] = message,
                        None => self.messages.push(message),
                    }
                }
                debug!(room_id = %self.room_id, len = self.messages.len(), "applied snapshot");
                Applied::Reset
            }
            Event::Add(wire) | Event::Update(wire) => {
                self.upsert(wire.into_message(received_at))
            }
        }
    }

    /// Inserts a locally composed message ahead of any server echo.
    ///
    /// The eventual echo carries the same id and is absorbed as an
    /// in-place replace by [`RoomLog::apply`].
    pub fn append_local(&mut self, message: ChatMessage) -> Applied {
        self.upsert(message)
    }

    fn upsert(&mut self, message: ChatMessage) -> Applied {
        match self.position(&message.id) {
            Some(index) => {
                debug!(room_id = %self.room_id, id = %message.id, index, "replaced in place");
                self.messages[index] = message;
                Applied::Replaced
            }
            None => {
                debug!(room_id = %self.room_id, id = %message.id, "appended");
                self.messages.push(message);
                Applied::Appended
            }
        }
    }

    /// Builds the `all` snapshot event for the current log state.
    ///
    /// Used by authoritative holders of a log when answering a (re)join.
    pub fn snapshot(&self) -> Event {
        Event::All(Snapshot {
            messages: self.messages.iter().map(WireMessage::from_message).collect(),
        })
    }

    fn position(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|m| &m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::Role;

    fn wire(id: &str, content: &str) -> WireMessage {
        WireMessage {
            id: MessageId::new(id),
            content: content.to_string(),
            user: "Kapil".to_string(),
            role: Role::User,
            ts: Some(Timestamp::from_millis(1)),
        }
    }

    fn log_with(entries: &[(&str, &str)]) -> RoomLog {
        let mut log = RoomLog::new(RoomId::new("abc"));
        for (id, content) in entries {
            log.apply(Event::Add(wire(id, content)));
        }
        log
    }

    fn contents(log: &RoomLog) -> Vec<&str> {
        log.messages().iter().map(|m| m.content.as_str()).collect()
    }

    mod snapshot_application {
        use super::*;

        #[test]
        fn first_snapshot_populates_empty_log() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::All(Snapshot {
                messages: vec![wire("a", "one"), wire("b", "two")],
            }));

            assert_eq!(contents(&log), vec!["one", "two"]);
        }

        #[test]
        fn snapshot_replaces_entire_local_view() {
            let mut log = log_with(&[("stale1", "x"), ("stale2", "y")]);
            log.apply(Event::All(Snapshot {
                messages: vec![wire("a", "fresh")],
            }));

            assert_eq!(contents(&log), vec!["fresh"]);
        }

        #[test]
        fn applying_same_snapshot_twice_is_idempotent() {
            let snapshot = Event::All(Snapshot {
                messages: vec![wire("a", "one"), wire("b", "two")],
            });

            let mut once = RoomLog::new(RoomId::new("abc"));
            once.apply(snapshot.clone());

            let mut twice = RoomLog::new(RoomId::new("abc"));
            twice.apply(snapshot.clone());
            twice.apply(snapshot);

            assert_eq!(once.messages(), twice.messages());
        }

        #[test]
        fn duplicate_ids_inside_a_snapshot_collapse_to_one_entry() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::All(Snapshot {
                messages: vec![wire("a", "first"), wire("b", "two"), wire("a", "last")],
            }));

            assert_eq!(contents(&log), vec!["last", "two"]);
        }

        #[test]
        fn empty_snapshot_clears_the_log() {
            let mut log = log_with(&[("a", "one")]);
            let applied = log.apply(Event::All(Snapshot { messages: vec![] }));

            assert_eq!(applied, Applied::Reset);
            assert!(log.is_empty());
        }
    }

    mod add_upsert {
        use super::*;

        #[test]
        fn unknown_id_appends_at_tail() {
            let mut log = log_with(&[("a", "one")]);
            let applied = log.apply(Event::Add(wire("b", "two")));

            assert_eq!(applied, Applied::Appended);
            assert_eq!(contents(&log), vec!["one", "two"]);
        }

        #[test]
        fn same_id_converges_to_latest_content_without_duplicating() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::Add(wire("x", "A")));
            let applied = log.apply(Event::Add(wire("x", "B")));

            assert_eq!(applied, Applied::Replaced);
            assert_eq!(log.len(), 1);
            assert_eq!(log.messages()[0].content, "B");
        }

        #[test]
        fn echo_of_same_fields_is_a_noop_replace() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::Add(wire("x", "hello")));
            let before = log.messages().to_vec();

            log.apply(Event::Add(wire("x", "hello")));
            assert_eq!(log.messages(), before.as_slice());
        }

        #[test]
        fn replace_keeps_the_original_position() {
            let mut log = log_with(&[("a", "one"), ("b", "two"), ("c", "three")]);
            log.apply(Event::Add(wire("a", "ONE")));

            assert_eq!(contents(&log), vec!["ONE", "two", "three"]);
        }
    }

    mod update_upsert {
        use super::*;

        #[test]
        fn known_id_is_replaced_in_place() {
            let mut log = log_with(&[("1", "A"), ("2", "B"), ("3", "C")]);
            let applied = log.apply(Event::Update(wire("2", "new")));

            assert_eq!(applied, Applied::Replaced);
            assert_eq!(contents(&log), vec!["A", "new", "C"]);
        }

        #[test]
        fn unknown_id_degrades_to_an_append() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            let applied = log.apply(Event::Update(wire("x", "hi")));

            assert_eq!(applied, Applied::Appended);
            assert_eq!(log.len(), 1);
            assert_eq!(log.messages()[0].id.as_str(), "x");
            assert_eq!(log.messages()[0].content, "hi");
        }

        #[test]
        fn incoming_fields_win_on_collision() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::Add(WireMessage {
                user: "Sachin".to_string(),
                ..wire("x", "original")
            }));
            log.apply(Event::Update(wire("x", "rewritten")));

            let entry = log.get(&MessageId::new("x")).unwrap();
            assert_eq!(entry.content, "rewritten");
            assert_eq!(entry.user, "Kapil");
        }
    }

    mod timestamp_fallback {
        use super::*;

        #[test]
        fn missing_ts_resolves_to_receipt_time() {
            let before = Timestamp::now();
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::Add(WireMessage {
                ts: None,
                ..wire("a", "one")
            }));
            let after = Timestamp::now();

            let ts = log.messages()[0].ts;
            assert!(ts >= before && ts <= after);
        }

        #[test]
        fn carried_ts_is_kept_verbatim() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::Add(wire("a", "one")));
            assert_eq!(log.messages()[0].ts.as_millis(), 1);
        }

        #[test]
        fn snapshot_entries_without_ts_get_receipt_time() {
            let before = Timestamp::now();
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.apply(Event::All(Snapshot {
                messages: vec![WireMessage {
                    ts: None,
                    ..wire("a", "one")
                }],
            }));

            assert!(log.messages()[0].ts >= before);
        }
    }

    mod local_appends {
        use super::*;

        #[test]
        fn append_local_shows_up_immediately() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            let applied = log.append_local(wire("mine", "hello").into_message(Timestamp::now()));

            assert_eq!(applied, Applied::Appended);
            assert_eq!(log.len(), 1);
        }

        #[test]
        fn server_echo_absorbs_the_optimistic_entry() {
            let mut log = RoomLog::new(RoomId::new("abc"));
            log.append_local(wire("mine", "hello").into_message(Timestamp::now()));
            log.apply(Event::Add(wire("mine", "hello")));

            assert_eq!(log.len(), 1);
            assert_eq!(log.messages()[0].content, "hello");
        }
    }

    mod snapshot_export {
        use super::*;

        #[test]
        fn snapshot_round_trips_through_a_fresh_log() {
            let source = log_with(&[("a", "one"), ("b", "two")]);

            let mut copy = RoomLog::new(RoomId::new("abc"));
            copy.apply(source.snapshot());

            assert_eq!(copy.messages(), source.messages());
        }
    }

    mod uniqueness_invariant {
        use super::*;
        use proptest::prelude::*;

        fn ids_are_unique(log: &RoomLog) -> bool {
            let mut seen = std::collections::HashSet::new();
            log.messages().iter().all(|m| seen.insert(m.id.clone()))
        }

        fn arb_event() -> impl Strategy<Value = Event> {
            // A handful of ids guarantees frequent collisions.
            let arb_wire = ("[a-e]", "[a-z]{0,8}", proptest::option::of(0u64..1_000)).prop_map(
                |(id, content, ts)| WireMessage {
                    id: MessageId::new(id),
                    content,
                    user: "Kapil".to_string(),
                    role: Role::User,
                    ts: ts.map(Timestamp::from_millis),
                },
            );

            prop_oneof![
                arb_wire.clone().prop_map(Event::Add),
                arb_wire.clone().prop_map(Event::Update),
                proptest::collection::vec(arb_wire, 0..5)
                    .prop_map(|messages| Event::All(Snapshot { messages })),
            ]
        }

        proptest! {
            #[test]
            fn ids_stay_unique_under_any_event_sequence(
                events in proptest::collection::vec(arb_event(), 0..40)
            ) {
                let mut log = RoomLog::new(RoomId::new("abc"));
                for event in events {
                    log.apply(event);
                    prop_assert!(ids_are_unique(&log));
                }
            }

            #[test]
            fn reapplying_an_add_never_grows_the_log(
                event in arb_event(),
                others in proptest::collection::vec(arb_event(), 0..10)
            ) {
                let mut log = RoomLog::new(RoomId::new("abc"));
                for e in others {
                    log.apply(e);
                }
                log.apply(event.clone());
                let len = log.len();
                log.apply(event);
                prop_assert_eq!(log.len(), len);
            }
        }
    }
}
