//! Engine operations, their failure notices and the engine error type.

use crate::model::question::ValidationError;
use crate::remote::RemoteError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Engine entry point a notice or error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LoadSheet,
    ResetData,
    AddTopic,
    UpdateTopic,
    DeleteTopic,
    ReorderTopics,
    AddSubTopic,
    UpdateSubTopic,
    DeleteSubTopic,
    ReorderSubTopics,
    AddQuestion,
    UpdateQuestion,
    ToggleSolved,
    DeleteQuestion,
    ReorderQuestions,
}

impl Operation {
    /// Stable snake-case name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadSheet => "load_sheet",
            Self::ResetData => "reset_data",
            Self::AddTopic => "add_topic",
            Self::UpdateTopic => "update_topic",
            Self::DeleteTopic => "delete_topic",
            Self::ReorderTopics => "reorder_topics",
            Self::AddSubTopic => "add_sub_topic",
            Self::UpdateSubTopic => "update_sub_topic",
            Self::DeleteSubTopic => "delete_sub_topic",
            Self::ReorderSubTopics => "reorder_sub_topics",
            Self::AddQuestion => "add_question",
            Self::UpdateQuestion => "update_question",
            Self::ToggleSolved => "toggle_solved",
            Self::DeleteQuestion => "delete_question",
            Self::ReorderQuestions => "reorder_questions",
        }
    }

    /// User-facing message shown when the operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::LoadSheet => "Failed to load sheet",
            Self::ResetData => "Failed to reset sheet",
            Self::AddTopic => "Failed to add topic",
            Self::UpdateTopic => "Failed to update topic",
            Self::DeleteTopic => "Failed to delete topic",
            Self::ReorderTopics => "Failed to reorder topics",
            Self::AddSubTopic => "Failed to add sub-topic",
            Self::UpdateSubTopic => "Failed to update sub-topic",
            Self::DeleteSubTopic => "Failed to delete sub-topic",
            Self::ReorderSubTopics => "Failed to reorder sub-topics",
            Self::AddQuestion => "Failed to add question",
            Self::UpdateQuestion | Self::ToggleSolved => "Failed to update question",
            Self::DeleteQuestion => "Failed to delete question",
            Self::ReorderQuestions => "Failed to reorder questions",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient failure signal for the notification layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncNotice {
    pub operation: Operation,
    pub message: String,
}

impl SyncNotice {
    pub fn failed(operation: Operation) -> Self {
        Self {
            operation,
            message: operation.failure_message().to_string(),
        }
    }
}

/// Engine-level failure. Local state is consistent whenever one is returned.
#[derive(Debug)]
pub enum SyncError {
    /// Input rejected before anything was dispatched.
    Input(ValidationError),
    /// Target missing or request malformed; nothing applied, no remote call.
    /// Broadcast like a remote failure.
    Store(StoreError),
    /// Remote call failed; any optimistic change was rolled back.
    Remote {
        operation: Operation,
        source: RemoteError,
    },
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Remote { operation, source } => {
                write!(f, "{}: {source}", operation.failure_message())
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Input(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Remote { source, .. } => Some(source),
        }
    }
}

impl From<ValidationError> for SyncError {
    fn from(value: ValidationError) -> Self {
        Self::Input(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
