//! Structural integrity check for a `SheetState`.
//!
//! Used when adopting data from an untrusted source (durable snapshots) and by
//! tests after operation sequences. Reports the first violation found.

use super::url_index::UrlIndex;
use super::SheetState;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First invariant violation found in a sheet graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// A parent lists a child id that is missing from the child map.
    DanglingChild { parent: String, child: String },
    /// An id is listed twice, within one sequence or under two parents.
    RepeatedChild { parent: String, child: String },
    /// A map entry is not reachable from any parent sequence.
    Orphan(String),
    /// A map key differs from the id stored in its record.
    KeyMismatch { key: String, id: String },
    /// The incrementally maintained link index differs from a full rebuild.
    IndexDrift,
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingChild { parent, child } => {
                write!(f, "{parent} lists missing child {child}")
            }
            Self::RepeatedChild { parent, child } => {
                write!(f, "{parent} lists already-owned child {child}")
            }
            Self::Orphan(id) => write!(f, "entity {id} is not linked from any parent"),
            Self::KeyMismatch { key, id } => write!(f, "map key {key} holds record {id}"),
            Self::IndexDrift => write!(f, "link index differs from question map"),
        }
    }
}

impl Error for IntegrityError {}

impl SheetState {
    /// Verifies referential integrity, uniqueness, single ownership and index
    /// fidelity.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        for (key, topic) in self.topics() {
            if *key != topic.id {
                return Err(IntegrityError::KeyMismatch {
                    key: key.to_string(),
                    id: topic.id.to_string(),
                });
            }
        }
        for (key, sub_topic) in self.sub_topics() {
            if *key != sub_topic.id {
                return Err(IntegrityError::KeyMismatch {
                    key: key.to_string(),
                    id: sub_topic.id.to_string(),
                });
            }
        }
        for (key, question) in self.questions() {
            if *key != question.id {
                return Err(IntegrityError::KeyMismatch {
                    key: key.to_string(),
                    id: question.id.to_string(),
                });
            }
        }

        let mut seen_topics = HashSet::new();
        let mut seen_sub_topics = HashSet::new();
        let mut seen_questions = HashSet::new();

        for topic_id in self.topic_order() {
            let Some(topic) = self.topic(topic_id) else {
                return Err(IntegrityError::DanglingChild {
                    parent: "topic order".to_string(),
                    child: topic_id.to_string(),
                });
            };
            if !seen_topics.insert(topic_id) {
                return Err(IntegrityError::RepeatedChild {
                    parent: "topic order".to_string(),
                    child: topic_id.to_string(),
                });
            }
            for sub_topic_id in &topic.sub_topic_ids {
                let Some(sub_topic) = self.sub_topic(sub_topic_id) else {
                    return Err(IntegrityError::DanglingChild {
                        parent: topic_id.to_string(),
                        child: sub_topic_id.to_string(),
                    });
                };
                if !seen_sub_topics.insert(sub_topic_id) {
                    return Err(IntegrityError::RepeatedChild {
                        parent: topic_id.to_string(),
                        child: sub_topic_id.to_string(),
                    });
                }
                for question_id in &sub_topic.question_ids {
                    if self.question(question_id).is_none() {
                        return Err(IntegrityError::DanglingChild {
                            parent: sub_topic_id.to_string(),
                            child: question_id.to_string(),
                        });
                    }
                    if !seen_questions.insert(question_id) {
                        return Err(IntegrityError::RepeatedChild {
                            parent: sub_topic_id.to_string(),
                            child: question_id.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(id) = self.topics().keys().find(|id| !seen_topics.contains(id)) {
            return Err(IntegrityError::Orphan(id.to_string()));
        }
        if let Some(id) = self
            .sub_topics()
            .keys()
            .find(|id| !seen_sub_topics.contains(id))
        {
            return Err(IntegrityError::Orphan(id.to_string()));
        }
        if let Some(id) = self
            .questions()
            .keys()
            .find(|id| !seen_questions.contains(id))
        {
            return Err(IntegrityError::Orphan(id.to_string()));
        }

        if *self.url_index() != UrlIndex::rebuild(self.questions().values()) {
            return Err(IntegrityError::IndexDrift);
        }
        Ok(())
    }
}
