//! In-process remote-of-record backed by a durable snapshot.
//!
//! # Responsibility
//! - Implement `SheetPersistence` against a private `SheetState` copy.
//! - Persist the whole sheet through a `SnapshotRepository` after every
//!   successful write.
//! - Restore from the snapshot once, falling back to the bundled default
//!   dataset when it is missing or corrupt.
//!
//! # Invariants
//! - A write is visible only after its snapshot was saved; a failed save
//!   leaves the in-memory copy unchanged.
//! - A corrupt snapshot is cleared before the default dataset replaces it.
//! - Deleting a missing entity succeeds without changes; updating or
//!   creating under a missing entity fails with `NotFound`.

use super::{RemoteResult, SheetPersistence};
use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::model::question::{Question, QuestionDraft, QuestionPatch};
use crate::model::sheet::{SheetData, SubTopic, Topic};
use crate::repo::snapshot_repo::{RepoError, SnapshotRepository};
use crate::seed;
use crate::store::{SheetState, StoreError};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Local persistence service owning the authoritative sheet copy.
pub struct LocalSheetService<R: SnapshotRepository> {
    repo: R,
    state: Mutex<Option<SheetState>>,
}

impl<R: SnapshotRepository> LocalSheetService<R> {
    /// Creates a service that restores lazily on first access.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: Mutex::new(None),
        }
    }

    /// Snapshot repository backing this service.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn lock(&self) -> MutexGuard<'_, Option<SheetState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn loaded<'a>(&self, slot: &'a mut Option<SheetState>) -> RemoteResult<&'a mut SheetState> {
        let state = match slot.take() {
            Some(state) => state,
            None => self.restore()?,
        };
        Ok(slot.insert(state))
    }

    fn restore(&self) -> RemoteResult<SheetState> {
        match self.repo.load_snapshot() {
            Ok(Some(data)) => {
                let state = SheetState::from_data(data);
                match state.check_integrity() {
                    Ok(()) => {
                        info!(
                            "event=snapshot_restore module=remote status=ok topics={} questions={}",
                            state.topics().len(),
                            state.questions().len()
                        );
                        return Ok(state);
                    }
                    Err(err) => {
                        warn!(
                            "event=snapshot_restore module=remote status=corrupt error={}",
                            err
                        );
                        self.discard_snapshot();
                    }
                }
            }
            Ok(None) => info!("event=snapshot_restore module=remote status=empty"),
            Err(RepoError::InvalidData(message)) => {
                warn!(
                    "event=snapshot_restore module=remote status=corrupt error={}",
                    message
                );
                self.discard_snapshot();
            }
            Err(err) => return Err(err.into()),
        }

        let state = SheetState::from_data(seed::default_sheet()?);
        self.repo.save_snapshot(&state.to_data())?;
        info!(
            "event=seed_load module=remote status=ok topics={} questions={}",
            state.topics().len(),
            state.questions().len()
        );
        Ok(state)
    }

    fn discard_snapshot(&self) {
        if let Err(err) = self.repo.clear_snapshot() {
            warn!(
                "event=snapshot_clear module=remote status=error error={}",
                err
            );
        }
    }

    fn read<T>(&self, f: impl FnOnce(&SheetState) -> T) -> RemoteResult<T> {
        let mut slot = self.lock();
        let state = self.loaded(&mut slot)?;
        Ok(f(state))
    }

    /// Runs `f` on a scratch copy and commits it once the snapshot is saved.
    fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut SheetState) -> RemoteResult<T>,
    ) -> RemoteResult<T> {
        let mut slot = self.lock();
        let result = self.loaded(&mut slot).and_then(|current| {
            let mut next = current.clone();
            let value = f(&mut next)?;
            self.repo.save_snapshot(&next.to_data())?;
            *current = next;
            Ok(value)
        });
        match &result {
            Ok(_) => debug!("event=remote_write module=remote status=ok op={operation}"),
            Err(err) => warn!(
                "event=remote_write module=remote status=error op={} error={}",
                operation, err
            ),
        }
        result
    }
}

/// Treats a missing target as an already-applied delete or reorder.
fn absent_is_noop<T>(result: Result<T, StoreError>) -> RemoteResult<()> {
    match result {
        Ok(_)
        | Err(StoreError::TopicNotFound(_))
        | Err(StoreError::SubTopicNotFound(_))
        | Err(StoreError::QuestionNotFound(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl<R: SnapshotRepository> SheetPersistence for LocalSheetService<R> {
    async fn get_sheet(&self) -> RemoteResult<SheetData> {
        self.read(SheetState::to_data)
    }

    async fn create_topic(&self, name: &str) -> RemoteResult<Topic> {
        self.write("create_topic", |state| {
            let topic = Topic::new(TopicId::generate(), name);
            state.insert_topic(topic.clone())?;
            Ok(topic)
        })
    }

    async fn update_topic(&self, id: &TopicId, name: &str) -> RemoteResult<Topic> {
        self.write("update_topic", |state| {
            state.rename_topic(id, name.to_string())?;
            state
                .topic(id)
                .cloned()
                .ok_or_else(|| StoreError::TopicNotFound(id.clone()).into())
        })
    }

    async fn delete_topic(&self, id: &TopicId) -> RemoteResult<()> {
        self.write("delete_topic", |state| absent_is_noop(state.remove_topic(id)))
    }

    async fn create_sub_topic(&self, topic_id: &TopicId, name: &str) -> RemoteResult<SubTopic> {
        self.write("create_sub_topic", |state| {
            let sub_topic = SubTopic::new(SubTopicId::generate(), name);
            state.insert_sub_topic(topic_id, sub_topic.clone())?;
            Ok(sub_topic)
        })
    }

    async fn update_sub_topic(&self, id: &SubTopicId, name: &str) -> RemoteResult<SubTopic> {
        self.write("update_sub_topic", |state| {
            state.rename_sub_topic(id, name.to_string())?;
            state
                .sub_topic(id)
                .cloned()
                .ok_or_else(|| StoreError::SubTopicNotFound(id.clone()).into())
        })
    }

    async fn delete_sub_topic(&self, topic_id: &TopicId, id: &SubTopicId) -> RemoteResult<()> {
        self.write("delete_sub_topic", |state| {
            absent_is_noop(state.remove_sub_topic(topic_id, id))
        })
    }

    async fn create_question(
        &self,
        sub_topic_id: &SubTopicId,
        draft: &QuestionDraft,
    ) -> RemoteResult<Question> {
        self.write("create_question", |state| {
            let question = Question::from_draft(QuestionId::generate(), draft);
            state.insert_question(sub_topic_id, question.clone())?;
            Ok(question)
        })
    }

    async fn update_question(
        &self,
        id: &QuestionId,
        patch: &QuestionPatch,
    ) -> RemoteResult<Question> {
        self.write("update_question", |state| {
            let next = state
                .question(id)
                .ok_or_else(|| StoreError::QuestionNotFound(id.clone()))?
                .patched(patch);
            state.replace_question(next.clone())?;
            Ok(next)
        })
    }

    async fn delete_question(
        &self,
        sub_topic_id: &SubTopicId,
        id: &QuestionId,
    ) -> RemoteResult<()> {
        self.write("delete_question", |state| {
            absent_is_noop(state.remove_question(sub_topic_id, id))
        })
    }

    async fn reorder_topics(&self, order: &[TopicId]) -> RemoteResult<()> {
        self.write("reorder_topics", |state| {
            state.replace_topic_order(order.to_vec())?;
            Ok(())
        })
    }

    async fn reorder_sub_topics(
        &self,
        topic_id: &TopicId,
        order: &[SubTopicId],
    ) -> RemoteResult<()> {
        self.write("reorder_sub_topics", |state| {
            absent_is_noop(state.replace_sub_topic_order(topic_id, order.to_vec()))
        })
    }

    async fn reorder_questions(
        &self,
        sub_topic_id: &SubTopicId,
        order: &[QuestionId],
    ) -> RemoteResult<()> {
        self.write("reorder_questions", |state| {
            absent_is_noop(state.replace_question_order(sub_topic_id, order.to_vec()))
        })
    }

    async fn reset_data(&self) -> RemoteResult<SheetData> {
        let mut slot = self.lock();
        self.repo.clear_snapshot()?;
        *slot = None;
        let state = self.loaded(&mut slot)?;
        info!(
            "event=remote_reset module=remote status=ok topics={}",
            state.topics().len()
        );
        Ok(state.to_data())
    }
}
