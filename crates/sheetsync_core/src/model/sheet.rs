//! Sheet, topic and sub-topic records plus the serializable sheet bundle.
//!
//! # Invariants
//! - `Topic::sub_topic_ids` and `SubTopic::question_ids` hold no duplicates.
//! - `SheetData::topic_order` is a permutation of the `topics` keys.
//!
//! Wire names are camelCase so snapshots written by older hosts stay readable.

use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::model::question::Question;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root sheet metadata. Read-only for the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub banner: String,
}

/// Top-level grouping that owns an ordered list of sub-topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    #[serde(default)]
    pub sub_topic_ids: Vec<SubTopicId>,
}

impl Topic {
    /// Creates an empty topic.
    pub fn new(id: TopicId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sub_topic_ids: Vec::new(),
        }
    }
}

/// Second-level grouping that owns an ordered list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTopic {
    pub id: SubTopicId,
    pub name: String,
    #[serde(default)]
    pub question_ids: Vec<QuestionId>,
}

impl SubTopic {
    /// Creates an empty sub-topic.
    pub fn new(id: SubTopicId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            question_ids: Vec::new(),
        }
    }
}

/// Full normalized sheet as exchanged with persistence.
///
/// Returned by `get_sheet`/`reset_data` and stored as the durable local
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    pub sheet: Sheet,
    #[serde(default)]
    pub topics: HashMap<TopicId, Topic>,
    #[serde(default)]
    pub sub_topics: HashMap<SubTopicId, SubTopic>,
    #[serde(default)]
    pub questions: HashMap<QuestionId, Question>,
    #[serde(default)]
    pub topic_order: Vec<TopicId>,
}
