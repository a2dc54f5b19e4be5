//! Timestamp value object for message times.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
///
/// Timestamps are advisory display values: ordering of the message log is
/// never derived from them. The wire representation is a non-negative
/// integer, enforced by the unsigned inner type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        // timestamp_millis() is negative only before 1970.
        Self(Utc::now().timestamp_millis().max(0) as u64)
    }

    /// Creates a timestamp from epoch milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as epoch milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_bounded_by_wall_clock() {
        let before = Utc::now().timestamp_millis() as u64;
        let ts = Timestamp::now();
        let after = Utc::now().timestamp_millis() as u64;

        assert!(ts.as_millis() >= before);
        assert!(ts.as_millis() <= after);
    }

    #[test]
    fn from_millis_roundtrips() {
        let ts = Timestamp::from_millis(1_705_276_800_000);
        assert_eq!(ts.as_millis(), 1_705_276_800_000);
    }

    #[test]
    fn serializes_as_bare_integer() {
        let ts = Timestamp::from_millis(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
    }

    #[test]
    fn rejects_negative_wire_values() {
        let result: Result<Timestamp, _> = serde_json::from_str("-5");
        assert!(result.is_err());
    }

    #[test]
    fn ordering_follows_millis() {
        assert!(Timestamp::from_millis(1) < Timestamp::from_millis(2));
    }
}
