//! Strongly-typed identifiers for engine entities.
//!
//! Generated IDs use ULID (Universally Unique Lexicographically Sortable
//! Identifier) format, so actions and events sort by creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Generates a ULID-backed identifier with a display prefix.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Creates a new ID from a fresh ULID.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Creates an ID from a ULID.
            #[must_use]
            pub const fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// Returns the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ulid::from_str(raw).map(Self).map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    reason: e.to_string(),
                })
            }
        }
    };
}

define_id!(
    /// Identifier of an inbound event received from a connector.
    EventId,
    "evt"
);

define_id!(
    /// Identifier of an action (inbound or outbound) in a story.
    ActionId,
    "act"
);

define_id!(
    /// Identifier of a dialog between two players.
    DialogId,
    "dlg"
);

define_id!(
    /// Identifier of a story segment inside a dialog.
    StoryId,
    "sto"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_prefix() {
        assert!(ActionId::new().to_string().starts_with("act_"));
        assert!(DialogId::new().to_string().starts_with("dlg_"));
    }

    #[test]
    fn parse_accepts_prefixed_and_raw_forms() {
        let id = StoryId::new();
        let prefixed: StoryId = id.to_string().parse().expect("should parse");
        let raw: StoryId = id.as_ulid().to_string().parse().expect("should parse");
        assert_eq!(id, prefixed);
        assert_eq!(id, raw);
    }

    #[test]
    fn parse_reports_id_type() {
        let err = "evt_nope".parse::<EventId>().unwrap_err();
        assert_eq!(err.id_type, "EventId");
    }

    #[test]
    fn ids_sort_by_creation() {
        let first = ActionId::from_ulid(Ulid::from_parts(1_000, 7));
        let second = ActionId::from_ulid(Ulid::from_parts(2_000, 3));
        assert!(first < second);
    }
}
