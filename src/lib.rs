//! Roomsync - Room-scoped real-time message synchronization.
//!
//! Clients attach to a named room and keep a consistent, ordered view of
//! the room's shared message log under concurrent appends, edits and
//! reconnects.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
