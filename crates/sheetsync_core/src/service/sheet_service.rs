//! Optimistic mutation engine.
//!
//! # Responsibility
//! - Own the client-side `SheetState` and keep it in step with a
//!   `SheetPersistence` remote.
//! - Apply mutate-class writes locally before the remote call and revert their
//!   scoped undo payload when the call fails.
//! - Link create-class entities only after the remote assigned their ids.
//! - Broadcast one `SyncNotice` per failed operation, whether the remote
//!   rejected it or its target was already missing locally.
//!
//! # Invariants
//! - The state lock is never held across an await; readers only ever see
//!   complete operations.
//! - Every returned error leaves the graph consistent. Input and not-found
//!   failures change nothing and skip the remote call.
//! - Input errors are returned only; they never reach the notice channel.
//! - Overlapping writes to the same entity are not serialized: a late
//!   rollback may overwrite a change that resolved in between.

use super::notice::{Operation, SyncError, SyncNotice};
use crate::config::{CoreConfig, DEFAULT_NOTICE_CAPACITY};
use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::model::question::{normalize_name, QuestionDraft, QuestionPatch};
use crate::remote::{RemoteError, RemoteResult, SheetPersistence};
use crate::search::duplicates::{find_duplicates, DuplicateLocation};
use crate::search::filter::{filter, SearchMatches};
use crate::store::mutation::Mutation;
use crate::store::progress::SheetProgress;
use crate::store::{SheetState, StoreError};
use log::{debug, info, warn};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

pub type SyncResult<T> = Result<T, SyncError>;

/// Client-resident sheet container synchronized with a remote-of-record.
pub struct SheetService<P: SheetPersistence> {
    remote: P,
    state: Mutex<SheetState>,
    notices: broadcast::Sender<SyncNotice>,
    loading: AtomicBool,
}

impl<P: SheetPersistence> SheetService<P> {
    /// Creates an empty, unloaded service.
    pub fn new(remote: P) -> Self {
        Self::with_notice_capacity(remote, DEFAULT_NOTICE_CAPACITY)
    }

    /// Creates a service using the notice buffer size from `config`.
    pub fn with_config(remote: P, config: &CoreConfig) -> Self {
        Self::with_notice_capacity(remote, config.notice_capacity)
    }

    fn with_notice_capacity(remote: P, capacity: usize) -> Self {
        let (notices, _) = broadcast::channel(capacity.max(1));
        Self {
            remote,
            state: Mutex::new(SheetState::new()),
            notices,
            loading: AtomicBool::new(false),
        }
    }

    pub fn remote(&self) -> &P {
        &self.remote
    }

    /// Receives a notice for every failed operation from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotice> {
        self.notices.subscribe()
    }

    /// True while `load_sheet` waits for the remote.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Runs `f` against the current graph.
    pub fn read<T>(&self, f: impl FnOnce(&SheetState) -> T) -> T {
        f(&*self.lock())
    }

    /// Detached copy of the current graph.
    pub fn snapshot(&self) -> SheetState {
        self.lock().clone()
    }

    /// Hierarchical search; `None` when the query is blank.
    pub fn search(&self, query: &str) -> Option<SearchMatches> {
        self.read(|state| filter(state, query))
    }

    /// Other questions sharing `problem_url`.
    pub fn find_duplicates(
        &self,
        problem_url: &str,
        exclude: Option<&QuestionId>,
    ) -> Vec<DuplicateLocation> {
        self.read(|state| find_duplicates(state, problem_url, exclude))
    }

    pub fn progress(&self) -> SheetProgress {
        self.read(SheetState::progress)
    }

    /// Replaces the graph with the remote sheet.
    pub async fn load_sheet(&self) -> SyncResult<()> {
        self.loading.store(true, Ordering::Release);
        let result = self.remote.get_sheet().await;
        self.loading.store(false, Ordering::Release);

        let data = result.map_err(|err| self.fail(Operation::LoadSheet, err))?;
        let mut state = self.lock();
        state.replace_all(data);
        info!(
            "event=sheet_load module=service status=ok topics={} questions={}",
            state.topics().len(),
            state.questions().len()
        );
        Ok(())
    }

    /// Restores the default dataset on the remote and adopts it locally.
    pub async fn reset_data(&self) -> SyncResult<()> {
        let data = self
            .remote
            .reset_data()
            .await
            .map_err(|err| self.fail(Operation::ResetData, err))?;
        let mut state = self.lock();
        state.replace_all(data);
        info!(
            "event=sheet_reset module=service status=ok topics={}",
            state.topics().len()
        );
        Ok(())
    }

    pub async fn add_topic(&self, name: &str) -> SyncResult<TopicId> {
        let name = normalize_name(name)?;
        let topic = self
            .remote
            .create_topic(&name)
            .await
            .map_err(|err| self.fail(Operation::AddTopic, err))?;
        let id = topic.id.clone();
        self.link(Operation::AddTopic, |state| state.insert_topic(topic))?;
        Ok(id)
    }

    pub async fn update_topic(&self, id: &TopicId, name: &str) -> SyncResult<()> {
        let name = normalize_name(name)?;
        let mutation = Mutation::RenameTopic {
            id: id.clone(),
            name: name.clone(),
        };
        self.commit(
            Operation::UpdateTopic,
            mutation,
            self.remote.update_topic(id, &name),
        )
        .await
    }

    /// Deletes a topic with every sub-topic and question it owns.
    pub async fn delete_topic(&self, id: &TopicId) -> SyncResult<()> {
        let mutation = Mutation::DeleteTopic { id: id.clone() };
        self.commit(Operation::DeleteTopic, mutation, self.remote.delete_topic(id))
            .await
    }

    pub async fn add_sub_topic(&self, topic_id: &TopicId, name: &str) -> SyncResult<SubTopicId> {
        let name = normalize_name(name)?;
        self.ensure(Operation::AddSubTopic, |state| {
            state
                .topic(topic_id)
                .map(|_| ())
                .ok_or_else(|| StoreError::TopicNotFound(topic_id.clone()))
        })?;
        let sub_topic = self
            .remote
            .create_sub_topic(topic_id, &name)
            .await
            .map_err(|err| self.fail(Operation::AddSubTopic, err))?;
        let id = sub_topic.id.clone();
        self.link(Operation::AddSubTopic, |state| {
            state.insert_sub_topic(topic_id, sub_topic)
        })?;
        Ok(id)
    }

    pub async fn update_sub_topic(&self, id: &SubTopicId, name: &str) -> SyncResult<()> {
        let name = normalize_name(name)?;
        let mutation = Mutation::RenameSubTopic {
            id: id.clone(),
            name: name.clone(),
        };
        self.commit(
            Operation::UpdateSubTopic,
            mutation,
            self.remote.update_sub_topic(id, &name),
        )
        .await
    }

    pub async fn delete_sub_topic(&self, topic_id: &TopicId, id: &SubTopicId) -> SyncResult<()> {
        let mutation = Mutation::DeleteSubTopic {
            topic_id: topic_id.clone(),
            id: id.clone(),
        };
        self.commit(
            Operation::DeleteSubTopic,
            mutation,
            self.remote.delete_sub_topic(topic_id, id),
        )
        .await
    }

    pub async fn add_question(
        &self,
        sub_topic_id: &SubTopicId,
        draft: &QuestionDraft,
    ) -> SyncResult<QuestionId> {
        let draft = draft.normalized()?;
        self.ensure(Operation::AddQuestion, |state| {
            state
                .sub_topic(sub_topic_id)
                .map(|_| ())
                .ok_or_else(|| StoreError::SubTopicNotFound(sub_topic_id.clone()))
        })?;
        let question = self
            .remote
            .create_question(sub_topic_id, &draft)
            .await
            .map_err(|err| self.fail(Operation::AddQuestion, err))?;
        let id = question.id.clone();
        self.link(Operation::AddQuestion, |state| {
            state.insert_question(sub_topic_id, question)
        })?;
        Ok(id)
    }

    /// Applies a partial update. An empty patch is accepted without a remote
    /// call.
    pub async fn update_question(&self, id: &QuestionId, patch: &QuestionPatch) -> SyncResult<()> {
        let patch = patch.normalized()?;
        if patch.is_empty() {
            return self.ensure(Operation::UpdateQuestion, |state| {
                state
                    .question(id)
                    .map(|_| ())
                    .ok_or_else(|| StoreError::QuestionNotFound(id.clone()))
            });
        }
        let mutation = Mutation::UpdateQuestion {
            id: id.clone(),
            patch: patch.clone(),
        };
        self.commit(
            Operation::UpdateQuestion,
            mutation,
            self.remote.update_question(id, &patch),
        )
        .await
    }

    /// Flips the solved flag and returns the new value.
    pub async fn toggle_solved(&self, id: &QuestionId) -> SyncResult<bool> {
        let solved = self.ensure(Operation::ToggleSolved, |state| {
            state
                .question(id)
                .map(|question| !question.is_solved)
                .ok_or_else(|| StoreError::QuestionNotFound(id.clone()))
        })?;
        let patch = QuestionPatch::solved(solved);
        let mutation = Mutation::UpdateQuestion {
            id: id.clone(),
            patch: patch.clone(),
        };
        self.commit(
            Operation::ToggleSolved,
            mutation,
            self.remote.update_question(id, &patch),
        )
        .await?;
        Ok(solved)
    }

    pub async fn delete_question(&self, sub_topic_id: &SubTopicId, id: &QuestionId) -> SyncResult<()> {
        let mutation = Mutation::DeleteQuestion {
            sub_topic_id: sub_topic_id.clone(),
            id: id.clone(),
        };
        self.commit(
            Operation::DeleteQuestion,
            mutation,
            self.remote.delete_question(sub_topic_id, id),
        )
        .await
    }

    /// Mutate-class protocol: apply, await the remote, revert on failure.
    ///
    /// `call` is lazy and only runs once the mutation applied cleanly.
    pub(super) async fn commit<T>(
        &self,
        operation: Operation,
        mutation: Mutation,
        call: impl Future<Output = RemoteResult<T>>,
    ) -> SyncResult<()> {
        let undo = {
            let mut state = self.lock();
            mutation
                .apply(&mut *state)
                .map_err(|err| self.reject(operation, err))?
        };
        match call.await {
            Ok(_) => {
                debug!(
                    "event=mutation_commit module=service status=ok op={}",
                    operation
                );
                Ok(())
            }
            Err(err) => {
                undo.revert(&mut *self.lock());
                Err(self.fail(operation, err))
            }
        }
    }

    /// Create-class tail: links a remotely created entity.
    fn link(
        &self,
        operation: Operation,
        insert: impl FnOnce(&mut SheetState) -> Result<(), StoreError>,
    ) -> SyncResult<()> {
        let mut state = self.lock();
        let linked = insert(&mut *state);
        drop(state);
        linked.map_err(|err| self.reject(operation, err))
    }

    /// Runs a local precondition for `operation`; a failure is rejected.
    pub(super) fn ensure<T>(
        &self,
        operation: Operation,
        check: impl FnOnce(&SheetState) -> Result<T, StoreError>,
    ) -> SyncResult<T> {
        let checked = check(&*self.lock());
        checked.map_err(|err| self.reject(operation, err))
    }

    /// Logs and broadcasts a locally rejected operation.
    fn reject(&self, operation: Operation, err: StoreError) -> SyncError {
        warn!(
            "event=local_reject module=service status=error op={} error={}",
            operation, err
        );
        let _ = self.notices.send(SyncNotice::failed(operation));
        SyncError::Store(err)
    }

    /// Logs and broadcasts a remote failure, returning the engine error.
    fn fail(&self, operation: Operation, source: RemoteError) -> SyncError {
        warn!(
            "event=remote_call module=service status=error op={} error={}",
            operation, source
        );
        // No subscribers is fine: the error is still returned.
        let _ = self.notices.send(SyncNotice::failed(operation));
        SyncError::Remote { operation, source }
    }

    fn lock(&self) -> MutexGuard<'_, SheetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
