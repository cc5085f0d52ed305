//! Mutation commands and their scoped undo payloads.
//!
//! # Responsibility
//! - Describe every client-computable write as a `Mutation` value.
//! - Apply it to a `SheetState` in one synchronous step and hand back an
//!   `Undo` carrying only the substructure the mutation touched.
//!
//! # Invariants
//! - `apply` either succeeds fully or leaves the state untouched.
//! - `revert` never breaks referential integrity or sequence uniqueness, even
//!   when other mutations landed in between.
//! - Without interleaving writes, `revert(apply(m))` restores a deep-equal
//!   state.

use super::{
    RemovedQuestion, RemovedSubTopic, RemovedTopic, SheetState, StoreError, StoreResult,
};
use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::model::question::{Question, QuestionPatch};
use log::debug;

/// A client-computable write on the sheet graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    RenameTopic {
        id: TopicId,
        name: String,
    },
    RenameSubTopic {
        id: SubTopicId,
        name: String,
    },
    UpdateQuestion {
        id: QuestionId,
        patch: QuestionPatch,
    },
    DeleteTopic {
        id: TopicId,
    },
    DeleteSubTopic {
        topic_id: TopicId,
        id: SubTopicId,
    },
    DeleteQuestion {
        sub_topic_id: SubTopicId,
        id: QuestionId,
    },
    ReorderTopics {
        order: Vec<TopicId>,
    },
    ReorderSubTopics {
        topic_id: TopicId,
        order: Vec<SubTopicId>,
    },
    ReorderQuestions {
        sub_topic_id: SubTopicId,
        order: Vec<QuestionId>,
    },
}

/// What an applied mutation needs to put back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    TopicName { id: TopicId, name: String },
    SubTopicName { id: SubTopicId, name: String },
    Question(Box<Question>),
    Topic(Box<RemovedTopic>),
    SubTopic(Box<RemovedSubTopic>),
    RemovedQuestion(Box<RemovedQuestion>),
    TopicOrder(Vec<TopicId>),
    SubTopicOrder {
        topic_id: TopicId,
        order: Vec<SubTopicId>,
    },
    QuestionOrder {
        sub_topic_id: SubTopicId,
        order: Vec<QuestionId>,
    },
}

impl Mutation {
    /// Applies the mutation and returns its undo payload.
    pub fn apply(self, state: &mut SheetState) -> StoreResult<Undo> {
        let undo = match self {
            Self::RenameTopic { id, name } => {
                let previous = state.rename_topic(&id, name)?;
                Undo::TopicName { id, name: previous }
            }
            Self::RenameSubTopic { id, name } => {
                let previous = state.rename_sub_topic(&id, name)?;
                Undo::SubTopicName { id, name: previous }
            }
            Self::UpdateQuestion { id, patch } => {
                let current = state
                    .question(&id)
                    .ok_or_else(|| StoreError::QuestionNotFound(id.clone()))?;
                let next = current.patched(&patch);
                Undo::Question(Box::new(state.replace_question(next)?))
            }
            Self::DeleteTopic { id } => Undo::Topic(Box::new(state.remove_topic(&id)?)),
            Self::DeleteSubTopic { topic_id, id } => {
                Undo::SubTopic(Box::new(state.remove_sub_topic(&topic_id, &id)?))
            }
            Self::DeleteQuestion { sub_topic_id, id } => {
                Undo::RemovedQuestion(Box::new(state.remove_question(&sub_topic_id, &id)?))
            }
            Self::ReorderTopics { order } => Undo::TopicOrder(state.replace_topic_order(order)?),
            Self::ReorderSubTopics { topic_id, order } => {
                let previous = state.replace_sub_topic_order(&topic_id, order)?;
                Undo::SubTopicOrder {
                    topic_id,
                    order: previous,
                }
            }
            Self::ReorderQuestions {
                sub_topic_id,
                order,
            } => {
                let previous = state.replace_question_order(&sub_topic_id, order)?;
                Undo::QuestionOrder {
                    sub_topic_id,
                    order: previous,
                }
            }
        };
        Ok(undo)
    }
}

impl Undo {
    /// Puts the captured substructure back.
    ///
    /// Targets that disappeared in the meantime are skipped rather than
    /// recreated detached from the graph.
    pub fn revert(self, state: &mut SheetState) {
        match self {
            Self::TopicName { id, name } => {
                if state.rename_topic(&id, name).is_err() {
                    debug!("event=undo_skipped module=store kind=topic_name id={id}");
                }
            }
            Self::SubTopicName { id, name } => {
                if state.rename_sub_topic(&id, name).is_err() {
                    debug!("event=undo_skipped module=store kind=sub_topic_name id={id}");
                }
            }
            Self::Question(previous) => {
                let id = previous.id.clone();
                if state.replace_question(*previous).is_err() {
                    debug!("event=undo_skipped module=store kind=question id={id}");
                }
            }
            Self::Topic(removed) => {
                let id = removed.topic.id.clone();
                if !state.restore_topic(*removed) {
                    debug!("event=undo_skipped module=store kind=topic_delete id={id}");
                }
            }
            Self::SubTopic(removed) => {
                let id = removed.sub_topic.id.clone();
                if !state.restore_sub_topic(*removed) {
                    debug!("event=undo_skipped module=store kind=sub_topic_delete id={id}");
                }
            }
            Self::RemovedQuestion(removed) => {
                let id = removed.question.id.clone();
                if !state.restore_question(*removed) {
                    debug!("event=undo_skipped module=store kind=question_delete id={id}");
                }
            }
            Self::TopicOrder(order) => state.restore_topic_order(order),
            Self::SubTopicOrder { topic_id, order } => {
                state.restore_sub_topic_order(&topic_id, order)
            }
            Self::QuestionOrder {
                sub_topic_id,
                order,
            } => state.restore_question_order(&sub_topic_id, order),
        }
    }
}
