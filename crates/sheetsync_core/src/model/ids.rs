//! Opaque entity identifiers.
//!
//! Each tier gets its own newtype so a sub-topic id can never be passed where
//! a topic id is expected. Ids minted locally carry a kind prefix followed by
//! a v4 UUID; ids read from snapshots or seed data are kept verbatim.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Mints a fresh identifier.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a top-level topic.
    TopicId,
    "topic"
);
entity_id!(
    /// Identifier of a sub-topic owned by one topic.
    SubTopicId,
    "st"
);
entity_id!(
    /// Identifier of a question owned by one sub-topic.
    QuestionId,
    "q"
);

#[cfg(test)]
mod tests {
    use super::{QuestionId, SubTopicId, TopicId};

    #[test]
    fn generated_ids_carry_kind_prefix_and_differ() {
        let first = TopicId::generate();
        let second = TopicId::generate();
        assert!(first.as_str().starts_with("topic-"));
        assert_ne!(first, second);
        assert!(SubTopicId::generate().as_str().starts_with("st-"));
        assert!(QuestionId::generate().as_str().starts_with("q-"));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = QuestionId::new("6530dd2b1a2b3c4d5e6f7a8b");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6530dd2b1a2b3c4d5e6f7a8b\"");
    }
}
