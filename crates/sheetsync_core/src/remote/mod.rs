//! Persistence contract of the remote-of-record.
//!
//! # Responsibility
//! - Define the async calls the sync engine issues after each local change.
//! - Define the single error signal every call may fail with.
//!
//! # Invariants
//! - Ids are assigned here; callers never invent ids for created entities.
//! - A failed call leaves the persisted data unchanged.

pub mod local;

use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::model::question::{Question, QuestionDraft, QuestionPatch};
use crate::model::sheet::{SheetData, SubTopic, Topic};
use crate::repo::snapshot_repo::RepoError;
use crate::seed::SeedError;
use crate::store::StoreError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Entity tier named by a not-found failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Topic,
    SubTopic,
    Question,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::SubTopic => "sub-topic",
            Self::Question => "question",
        }
    }
}

/// Failure of a persistence call.
#[derive(Debug)]
pub enum RemoteError {
    /// Target or parent entity does not exist on the remote side.
    NotFound { kind: EntityKind, id: String },
    /// Request is well-formed but conflicts with the persisted graph.
    Rejected(StoreError),
    /// Durable snapshot could not be read or written.
    Storage(RepoError),
    /// Default dataset could not be parsed.
    Seed(SeedError),
    /// Service cannot be reached or refused to answer.
    Unavailable(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::Rejected(err) => write!(f, "request rejected: {err}"),
            Self::Storage(err) => write!(f, "snapshot storage failed: {err}"),
            Self::Seed(err) => write!(f, "{err}"),
            Self::Unavailable(reason) => write!(f, "persistence unavailable: {reason}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Seed(err) => Some(err),
            Self::NotFound { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<StoreError> for RemoteError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::TopicNotFound(id) => Self::NotFound {
                kind: EntityKind::Topic,
                id: id.to_string(),
            },
            StoreError::SubTopicNotFound(id) => Self::NotFound {
                kind: EntityKind::SubTopic,
                id: id.to_string(),
            },
            StoreError::QuestionNotFound(id) => Self::NotFound {
                kind: EntityKind::Question,
                id: id.to_string(),
            },
            other => Self::Rejected(other),
        }
    }
}

impl From<RepoError> for RemoteError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<SeedError> for RemoteError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

/// Async persistence contract.
///
/// Create calls return the stored entity with its assigned id. Update calls
/// return the stored record after the change.
#[async_trait]
pub trait SheetPersistence: Send + Sync {
    /// Full normalized sheet.
    async fn get_sheet(&self) -> RemoteResult<SheetData>;

    async fn create_topic(&self, name: &str) -> RemoteResult<Topic>;
    async fn update_topic(&self, id: &TopicId, name: &str) -> RemoteResult<Topic>;
    /// Deletes a topic with its subtree. Missing topics are a no-op.
    async fn delete_topic(&self, id: &TopicId) -> RemoteResult<()>;

    async fn create_sub_topic(&self, topic_id: &TopicId, name: &str) -> RemoteResult<SubTopic>;
    async fn update_sub_topic(&self, id: &SubTopicId, name: &str) -> RemoteResult<SubTopic>;
    /// Deletes a sub-topic with its questions. Missing sub-topics are a no-op.
    async fn delete_sub_topic(&self, topic_id: &TopicId, id: &SubTopicId) -> RemoteResult<()>;

    async fn create_question(
        &self,
        sub_topic_id: &SubTopicId,
        draft: &QuestionDraft,
    ) -> RemoteResult<Question>;
    async fn update_question(&self, id: &QuestionId, patch: &QuestionPatch)
        -> RemoteResult<Question>;
    /// Deletes one question. Missing questions are a no-op.
    async fn delete_question(&self, sub_topic_id: &SubTopicId, id: &QuestionId)
        -> RemoteResult<()>;

    async fn reorder_topics(&self, order: &[TopicId]) -> RemoteResult<()>;
    async fn reorder_sub_topics(&self, topic_id: &TopicId, order: &[SubTopicId])
        -> RemoteResult<()>;
    async fn reorder_questions(
        &self,
        sub_topic_id: &SubTopicId,
        order: &[QuestionId],
    ) -> RemoteResult<()>;

    /// Drops all persisted changes and returns the default dataset.
    async fn reset_data(&self) -> RemoteResult<SheetData>;
}
