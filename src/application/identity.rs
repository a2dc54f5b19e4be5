//! Client identity assignment.

use uuid::Uuid;

/// Display names handed out to clients that do not pick their own.
const NAME_POOL: [&str; 30] = [
    "Harmanpreet",
    "Smriti",
    "Jhulan",
    "Mithali",
    "Deepti",
    "Poonam",
    "Shafali",
    "Rajeshwari",
    "Sneh",
    "Shikha",
    "Punam",
    "Taniya",
    "Richa",
    "Jemimah",
    "Radha",
    "Kapil",
    "Sachin",
    "Dhoni",
    "Yuvraj",
    "Virender",
    "Gautam",
    "Zaheer",
    "Harbhajan",
    "Virat",
    "Suresh",
    "Munaf",
    "Ashish",
    "Sreesanth",
    "Rohit",
    "Ravindra",
];

/// Who this client appears as in the room.
///
/// Assigned once per session. The synchronization core treats the name
/// as an opaque string; nothing verifies it, which is why identity is
/// not an authentication mechanism here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    display_name: String,
}

impl ClientIdentity {
    /// Uses an explicitly chosen display name.
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    /// Draws a display name from the built-in pool.
    pub fn random() -> Self {
        let pick = Uuid::new_v4().as_u128() as usize % NAME_POOL.len();
        Self::named(NAME_POOL[pick])
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}
