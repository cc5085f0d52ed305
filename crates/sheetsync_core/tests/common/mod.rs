#![allow(dead_code)]

use async_trait::async_trait;
use sheetsync_core::{
    LocalSheetService, MemorySnapshotRepository, Question, QuestionDraft, QuestionId,
    QuestionPatch, RemoteError, RemoteResult, SheetData, SheetPersistence, SheetService,
    SubTopic, SubTopicId, Topic, TopicId,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Local service wrapper that can fail calls or hold them open.
pub struct ScriptedRemote {
    inner: LocalSheetService<MemorySnapshotRepository>,
    failing: AtomicBool,
    holding: AtomicBool,
    calls: AtomicUsize,
    entered: Notify,
    gate: Notify,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self {
            inner: LocalSheetService::new(MemorySnapshotRepository::new()),
            failing: AtomicBool::new(false),
            holding: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Makes every following call fail (or succeed again).
    pub fn fail_calls(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes following calls wait until `release` is called once per call.
    pub fn hold_calls(&self, holding: bool) {
        self.holding.store(holding, Ordering::SeqCst);
    }

    /// Resolves when a held call has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets one held call proceed.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &LocalSheetService<MemorySnapshotRepository> {
        &self.inner
    }

    async fn script(&self) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing.load(Ordering::SeqCst);
        if self.holding.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.gate.notified().await;
        }
        if failing {
            return Err(RemoteError::Unavailable("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetPersistence for ScriptedRemote {
    async fn get_sheet(&self) -> RemoteResult<SheetData> {
        self.script().await?;
        self.inner.get_sheet().await
    }

    async fn create_topic(&self, name: &str) -> RemoteResult<Topic> {
        self.script().await?;
        self.inner.create_topic(name).await
    }

    async fn update_topic(&self, id: &TopicId, name: &str) -> RemoteResult<Topic> {
        self.script().await?;
        self.inner.update_topic(id, name).await
    }

    async fn delete_topic(&self, id: &TopicId) -> RemoteResult<()> {
        self.script().await?;
        self.inner.delete_topic(id).await
    }

    async fn create_sub_topic(&self, topic_id: &TopicId, name: &str) -> RemoteResult<SubTopic> {
        self.script().await?;
        self.inner.create_sub_topic(topic_id, name).await
    }

    async fn update_sub_topic(&self, id: &SubTopicId, name: &str) -> RemoteResult<SubTopic> {
        self.script().await?;
        self.inner.update_sub_topic(id, name).await
    }

    async fn delete_sub_topic(&self, topic_id: &TopicId, id: &SubTopicId) -> RemoteResult<()> {
        self.script().await?;
        self.inner.delete_sub_topic(topic_id, id).await
    }

    async fn create_question(
        &self,
        sub_topic_id: &SubTopicId,
        draft: &QuestionDraft,
    ) -> RemoteResult<Question> {
        self.script().await?;
        self.inner.create_question(sub_topic_id, draft).await
    }

    async fn update_question(
        &self,
        id: &QuestionId,
        patch: &QuestionPatch,
    ) -> RemoteResult<Question> {
        self.script().await?;
        self.inner.update_question(id, patch).await
    }

    async fn delete_question(
        &self,
        sub_topic_id: &SubTopicId,
        id: &QuestionId,
    ) -> RemoteResult<()> {
        self.script().await?;
        self.inner.delete_question(sub_topic_id, id).await
    }

    async fn reorder_topics(&self, order: &[TopicId]) -> RemoteResult<()> {
        self.script().await?;
        self.inner.reorder_topics(order).await
    }

    async fn reorder_sub_topics(
        &self,
        topic_id: &TopicId,
        order: &[SubTopicId],
    ) -> RemoteResult<()> {
        self.script().await?;
        self.inner.reorder_sub_topics(topic_id, order).await
    }

    async fn reorder_questions(
        &self,
        sub_topic_id: &SubTopicId,
        order: &[QuestionId],
    ) -> RemoteResult<()> {
        self.script().await?;
        self.inner.reorder_questions(sub_topic_id, order).await
    }

    async fn reset_data(&self) -> RemoteResult<SheetData> {
        self.script().await?;
        self.inner.reset_data().await
    }
}

/// Service loaded with the bundled default sheet.
pub async fn loaded_service() -> SheetService<ScriptedRemote> {
    let service = SheetService::new(ScriptedRemote::new());
    service.load_sheet().await.unwrap();
    service
}

pub fn topic_named(service: &SheetService<ScriptedRemote>, name: &str) -> TopicId {
    service.read(|state| {
        state
            .topics_in_order()
            .find(|topic| topic.name == name)
            .map(|topic| topic.id.clone())
            .unwrap()
    })
}

pub fn question_titled(service: &SheetService<ScriptedRemote>, title: &str) -> (SubTopicId, QuestionId) {
    service.read(|state| {
        state
            .walk()
            .find(|(_, _, question)| question.title == title)
            .map(|(_, sub_topic, question)| (sub_topic.id.clone(), question.id.clone()))
            .unwrap()
    })
}
