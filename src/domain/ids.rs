//! Domain identifier types with proper encapsulation.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True if the identifier is empty (malformed upstream data).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id! {
    /// Outcome token identifier - newtype for type safety.
    TokenId
}

string_id! {
    /// Binary event identifier - newtype for type safety.
    EventId
}

string_id! {
    /// Unique identifier assigned to a detected opportunity.
    OpportunityId
}

impl OpportunityId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_new_and_as_str() {
        let id = TokenId::new("test-token");
        assert_eq!(id.as_str(), "test-token");
        assert!(!id.is_empty());
    }

    #[test]
    fn token_id_empty() {
        let id = TokenId::new("");
        assert!(id.is_empty());
    }

    #[test]
    fn event_id_from_str_and_display() {
        let id = EventId::from("event-42");
        assert_eq!(format!("{}", id), "event-42");
    }

    #[test]
    fn opportunity_ids_are_unique() {
        let a = OpportunityId::generate();
        let b = OpportunityId::generate();
        assert_ne!(a, b);
    }
}
