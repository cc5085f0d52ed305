//! Normalized in-memory entity store.
//!
//! # Responsibility
//! - Hold the topic/sub-topic/question maps, the topic order and the derived
//!   `UrlIndex`.
//! - Expose read access plus the structural primitives used by mutation
//!   commands: insert-and-link, unlink-and-remove (cascading), rename,
//!   replace-record and replace-order.
//!
//! # Invariants
//! - Every child id listed by a parent resolves in the child map.
//! - No id appears twice in one ordered sequence.
//! - Removing a topic or sub-topic removes its whole subtree, index entries
//!   included.
//! - Every primitive validates its targets before writing, so an `Err` leaves
//!   the state untouched.

pub mod integrity;
pub mod mutation;
pub mod progress;
pub mod url_index;

use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::model::question::Question;
use crate::model::sheet::{Sheet, SheetData, SubTopic, Topic};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use url_index::UrlIndex;

/// Result type used by store primitives.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failures. All of them are raised before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    TopicNotFound(TopicId),
    SubTopicNotFound(SubTopicId),
    QuestionNotFound(QuestionId),
    /// Sub-topic exists but is not listed under the given topic.
    SubTopicNotInTopic {
        topic_id: TopicId,
        sub_topic_id: SubTopicId,
    },
    /// Question exists but is not listed under the given sub-topic.
    QuestionNotInSubTopic {
        sub_topic_id: SubTopicId,
        question_id: QuestionId,
    },
    /// An entity with this id is already present.
    DuplicateId(String),
    /// Replacement order is not a permutation of the current sequence.
    InvalidOrder {
        expected_len: usize,
        actual_len: usize,
    },
    /// Move source or target is outside the sequence.
    PositionOutOfRange { position: usize, len: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::SubTopicNotFound(id) => write!(f, "sub-topic not found: {id}"),
            Self::QuestionNotFound(id) => write!(f, "question not found: {id}"),
            Self::SubTopicNotInTopic {
                topic_id,
                sub_topic_id,
            } => write!(f, "sub-topic {sub_topic_id} is not owned by topic {topic_id}"),
            Self::QuestionNotInSubTopic {
                sub_topic_id,
                question_id,
            } => write!(
                f,
                "question {question_id} is not owned by sub-topic {sub_topic_id}"
            ),
            Self::DuplicateId(id) => write!(f, "entity id already present: {id}"),
            Self::InvalidOrder {
                expected_len,
                actual_len,
            } => write!(
                f,
                "order must be a permutation of {expected_len} current ids, got {actual_len} ids"
            ),
            Self::PositionOutOfRange { position, len } => {
                write!(f, "position {position} is outside a sequence of {len}")
            }
        }
    }
}

impl Error for StoreError {}

/// A question unlinked from its sub-topic, with enough context to relink it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedQuestion {
    pub sub_topic_id: SubTopicId,
    pub position: usize,
    pub question: Question,
}

/// A sub-topic subtree unlinked from its topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSubTopic {
    pub topic_id: TopicId,
    pub position: usize,
    pub sub_topic: SubTopic,
    pub questions: Vec<Question>,
}

/// A topic subtree unlinked from the topic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedTopic {
    pub position: usize,
    pub topic: Topic,
    pub sub_topics: Vec<SubTopic>,
    pub questions: Vec<Question>,
}

impl RemovedTopic {
    /// Number of entities removed: the topic, its sub-topics and questions.
    pub fn entity_count(&self) -> usize {
        1 + self.sub_topics.len() + self.questions.len()
    }
}

/// Normalized sheet graph plus the derived link index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetState {
    sheet: Option<Sheet>,
    topics: HashMap<TopicId, Topic>,
    sub_topics: HashMap<SubTopicId, SubTopic>,
    questions: HashMap<QuestionId, Question>,
    topic_order: Vec<TopicId>,
    url_index: UrlIndex,
}

impl SheetState {
    /// Creates an empty, unloaded state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from a loaded bundle, rebuilding the index once.
    pub fn from_data(data: SheetData) -> Self {
        let mut state = Self::new();
        state.replace_all(data);
        state
    }

    /// Replaces the whole graph (load/reset).
    pub fn replace_all(&mut self, data: SheetData) {
        let SheetData {
            sheet,
            topics,
            sub_topics,
            questions,
            topic_order,
        } = data;
        self.url_index = UrlIndex::rebuild(questions.values());
        self.sheet = Some(sheet);
        self.topics = topics;
        self.sub_topics = sub_topics;
        self.questions = questions;
        self.topic_order = topic_order;
    }

    /// Serializable copy of the graph.
    pub fn to_data(&self) -> SheetData {
        SheetData {
            sheet: self.sheet.clone().unwrap_or_default(),
            topics: self.topics.clone(),
            sub_topics: self.sub_topics.clone(),
            questions: self.questions.clone(),
            topic_order: self.topic_order.clone(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.sheet.is_some()
    }

    pub fn sheet(&self) -> Option<&Sheet> {
        self.sheet.as_ref()
    }

    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.get(id)
    }

    pub fn sub_topic(&self, id: &SubTopicId) -> Option<&SubTopic> {
        self.sub_topics.get(id)
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn topics(&self) -> &HashMap<TopicId, Topic> {
        &self.topics
    }

    pub fn sub_topics(&self) -> &HashMap<SubTopicId, SubTopic> {
        &self.sub_topics
    }

    pub fn questions(&self) -> &HashMap<QuestionId, Question> {
        &self.questions
    }

    pub fn topic_order(&self) -> &[TopicId] {
        &self.topic_order
    }

    pub fn url_index(&self) -> &UrlIndex {
        &self.url_index
    }

    /// Topics in display order. Dangling order entries are skipped.
    pub fn topics_in_order(&self) -> impl Iterator<Item = &Topic> + '_ {
        self.topic_order
            .iter()
            .filter_map(|id| self.topics.get(id))
    }

    /// Sub-topics of `topic` in display order.
    pub fn sub_topics_of<'a>(
        &'a self,
        topic: &'a Topic,
    ) -> impl Iterator<Item = &'a SubTopic> + 'a {
        topic
            .sub_topic_ids
            .iter()
            .filter_map(|id| self.sub_topics.get(id))
    }

    /// Questions of `sub_topic` in display order.
    pub fn questions_of<'a>(
        &'a self,
        sub_topic: &'a SubTopic,
    ) -> impl Iterator<Item = &'a Question> + 'a {
        sub_topic
            .question_ids
            .iter()
            .filter_map(|id| self.questions.get(id))
    }

    /// Every question with its owners, topic → sub-topic → question order.
    pub fn walk(&self) -> impl Iterator<Item = (&Topic, &SubTopic, &Question)> + '_ {
        self.topics_in_order().flat_map(move |topic| {
            self.sub_topics_of(topic).flat_map(move |sub_topic| {
                self.questions_of(sub_topic)
                    .map(move |question| (topic, sub_topic, question))
            })
        })
    }

    /// Links a new topic at the end of the topic order.
    pub fn insert_topic(&mut self, topic: Topic) -> StoreResult<()> {
        if self.topics.contains_key(&topic.id) {
            return Err(StoreError::DuplicateId(topic.id.to_string()));
        }
        self.topic_order.push(topic.id.clone());
        self.topics.insert(topic.id.clone(), topic);
        Ok(())
    }

    /// Links a new sub-topic at the end of its topic.
    pub fn insert_sub_topic(&mut self, topic_id: &TopicId, sub_topic: SubTopic) -> StoreResult<()> {
        if self.sub_topics.contains_key(&sub_topic.id) {
            return Err(StoreError::DuplicateId(sub_topic.id.to_string()));
        }
        let topic = self
            .topics
            .get_mut(topic_id)
            .ok_or_else(|| StoreError::TopicNotFound(topic_id.clone()))?;
        topic.sub_topic_ids.push(sub_topic.id.clone());
        self.sub_topics.insert(sub_topic.id.clone(), sub_topic);
        Ok(())
    }

    /// Links a new question at the end of its sub-topic and indexes its link.
    pub fn insert_question(
        &mut self,
        sub_topic_id: &SubTopicId,
        question: Question,
    ) -> StoreResult<()> {
        if self.questions.contains_key(&question.id) {
            return Err(StoreError::DuplicateId(question.id.to_string()));
        }
        let sub_topic = self
            .sub_topics
            .get_mut(sub_topic_id)
            .ok_or_else(|| StoreError::SubTopicNotFound(sub_topic_id.clone()))?;
        sub_topic.question_ids.push(question.id.clone());
        self.url_index.apply_change(None, Some(&question));
        self.questions.insert(question.id.clone(), question);
        Ok(())
    }

    /// Renames a topic and returns the previous name.
    pub fn rename_topic(&mut self, id: &TopicId, name: String) -> StoreResult<String> {
        let topic = self
            .topics
            .get_mut(id)
            .ok_or_else(|| StoreError::TopicNotFound(id.clone()))?;
        Ok(std::mem::replace(&mut topic.name, name))
    }

    /// Renames a sub-topic and returns the previous name.
    pub fn rename_sub_topic(&mut self, id: &SubTopicId, name: String) -> StoreResult<String> {
        let sub_topic = self
            .sub_topics
            .get_mut(id)
            .ok_or_else(|| StoreError::SubTopicNotFound(id.clone()))?;
        Ok(std::mem::replace(&mut sub_topic.name, name))
    }

    /// Replaces a question record and returns the previous one.
    ///
    /// The link index moves only when `problem_url` actually changes.
    pub fn replace_question(&mut self, next: Question) -> StoreResult<Question> {
        let slot = self
            .questions
            .get_mut(&next.id)
            .ok_or_else(|| StoreError::QuestionNotFound(next.id.clone()))?;
        let previous = std::mem::replace(slot, next);
        self.url_index
            .apply_change(Some(&previous), self.questions.get(&previous.id));
        Ok(previous)
    }

    /// Unlinks a question from `sub_topic_id` and removes it.
    pub fn remove_question(
        &mut self,
        sub_topic_id: &SubTopicId,
        id: &QuestionId,
    ) -> StoreResult<RemovedQuestion> {
        if !self.questions.contains_key(id) {
            return Err(StoreError::QuestionNotFound(id.clone()));
        }
        let sub_topic = self
            .sub_topics
            .get_mut(sub_topic_id)
            .ok_or_else(|| StoreError::SubTopicNotFound(sub_topic_id.clone()))?;
        let position = sub_topic
            .question_ids
            .iter()
            .position(|candidate| candidate == id)
            .ok_or_else(|| StoreError::QuestionNotInSubTopic {
                sub_topic_id: sub_topic_id.clone(),
                question_id: id.clone(),
            })?;
        sub_topic.question_ids.remove(position);
        let question = self
            .drop_question(id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.clone()))?;
        Ok(RemovedQuestion {
            sub_topic_id: sub_topic_id.clone(),
            position,
            question,
        })
    }

    /// Unlinks a sub-topic from `topic_id` and removes it with its questions.
    pub fn remove_sub_topic(
        &mut self,
        topic_id: &TopicId,
        id: &SubTopicId,
    ) -> StoreResult<RemovedSubTopic> {
        if !self.sub_topics.contains_key(id) {
            return Err(StoreError::SubTopicNotFound(id.clone()));
        }
        let topic = self
            .topics
            .get_mut(topic_id)
            .ok_or_else(|| StoreError::TopicNotFound(topic_id.clone()))?;
        let position = topic
            .sub_topic_ids
            .iter()
            .position(|candidate| candidate == id)
            .ok_or_else(|| StoreError::SubTopicNotInTopic {
                topic_id: topic_id.clone(),
                sub_topic_id: id.clone(),
            })?;
        topic.sub_topic_ids.remove(position);
        let (sub_topic, questions) = self
            .drop_sub_topic(id)
            .ok_or_else(|| StoreError::SubTopicNotFound(id.clone()))?;
        Ok(RemovedSubTopic {
            topic_id: topic_id.clone(),
            position,
            sub_topic,
            questions,
        })
    }

    /// Removes a topic and cascades into its sub-topics and questions.
    pub fn remove_topic(&mut self, id: &TopicId) -> StoreResult<RemovedTopic> {
        let topic = self
            .topics
            .remove(id)
            .ok_or_else(|| StoreError::TopicNotFound(id.clone()))?;
        let position = self
            .topic_order
            .iter()
            .position(|candidate| candidate == id)
            .unwrap_or(self.topic_order.len());
        self.topic_order.retain(|candidate| candidate != id);

        let mut sub_topics = Vec::with_capacity(topic.sub_topic_ids.len());
        let mut questions = Vec::new();
        for sub_topic_id in &topic.sub_topic_ids {
            if let Some((sub_topic, removed)) = self.drop_sub_topic(sub_topic_id) {
                sub_topics.push(sub_topic);
                questions.extend(removed);
            }
        }
        Ok(RemovedTopic {
            position,
            topic,
            sub_topics,
            questions,
        })
    }

    /// Relinks a removed question. Returns `false` when its sub-topic is gone
    /// or the id was reused meanwhile.
    pub fn restore_question(&mut self, removed: RemovedQuestion) -> bool {
        let RemovedQuestion {
            sub_topic_id,
            position,
            question,
        } = removed;
        if self.questions.contains_key(&question.id) {
            return false;
        }
        let Some(sub_topic) = self.sub_topics.get_mut(&sub_topic_id) else {
            return false;
        };
        insert_clamped(&mut sub_topic.question_ids, position, question.id.clone());
        self.url_index.apply_change(None, Some(&question));
        self.questions.insert(question.id.clone(), question);
        true
    }

    /// Relinks a removed sub-topic subtree. Returns `false` when its topic is
    /// gone or the id was reused meanwhile.
    pub fn restore_sub_topic(&mut self, removed: RemovedSubTopic) -> bool {
        let RemovedSubTopic {
            topic_id,
            position,
            sub_topic,
            questions,
        } = removed;
        if self.sub_topics.contains_key(&sub_topic.id) {
            return false;
        }
        let Some(topic) = self.topics.get_mut(&topic_id) else {
            return false;
        };
        insert_clamped(&mut topic.sub_topic_ids, position, sub_topic.id.clone());
        self.adopt_sub_topic(sub_topic, questions);
        true
    }

    /// Relinks a removed topic subtree at its previous position.
    pub fn restore_topic(&mut self, removed: RemovedTopic) -> bool {
        let RemovedTopic {
            position,
            topic,
            sub_topics,
            questions,
        } = removed;
        if self.topics.contains_key(&topic.id) {
            return false;
        }
        let mut pending: HashMap<QuestionId, Question> = questions
            .into_iter()
            .map(|question| (question.id.clone(), question))
            .collect();
        let mut topic = topic;
        let mut adopted = Vec::with_capacity(sub_topics.len());
        for sub_topic in sub_topics {
            if self.sub_topics.contains_key(&sub_topic.id) {
                continue;
            }
            let owned = sub_topic
                .question_ids
                .iter()
                .filter_map(|id| pending.remove(id))
                .collect::<Vec<_>>();
            adopted.push((sub_topic, owned));
        }
        let kept: HashSet<&SubTopicId> = adopted.iter().map(|(st, _)| &st.id).collect();
        topic.sub_topic_ids.retain(|id| kept.contains(id));

        insert_clamped(&mut self.topic_order, position, topic.id.clone());
        self.topics.insert(topic.id.clone(), topic);
        for (sub_topic, owned) in adopted {
            self.adopt_sub_topic(sub_topic, owned);
        }
        true
    }

    /// Replaces the topic order and returns the previous one.
    pub fn replace_topic_order(&mut self, order: Vec<TopicId>) -> StoreResult<Vec<TopicId>> {
        ensure_permutation(&self.topic_order, &order)?;
        Ok(std::mem::replace(&mut self.topic_order, order))
    }

    /// Replaces the sub-topic order of one topic and returns the previous one.
    pub fn replace_sub_topic_order(
        &mut self,
        topic_id: &TopicId,
        order: Vec<SubTopicId>,
    ) -> StoreResult<Vec<SubTopicId>> {
        let topic = self
            .topics
            .get_mut(topic_id)
            .ok_or_else(|| StoreError::TopicNotFound(topic_id.clone()))?;
        ensure_permutation(&topic.sub_topic_ids, &order)?;
        Ok(std::mem::replace(&mut topic.sub_topic_ids, order))
    }

    /// Replaces the question order of one sub-topic and returns the previous one.
    pub fn replace_question_order(
        &mut self,
        sub_topic_id: &SubTopicId,
        order: Vec<QuestionId>,
    ) -> StoreResult<Vec<QuestionId>> {
        let sub_topic = self
            .sub_topics
            .get_mut(sub_topic_id)
            .ok_or_else(|| StoreError::SubTopicNotFound(sub_topic_id.clone()))?;
        ensure_permutation(&sub_topic.question_ids, &order)?;
        Ok(std::mem::replace(&mut sub_topic.question_ids, order))
    }

    /// Puts back a previous topic order, reconciled with the current topics.
    pub fn restore_topic_order(&mut self, previous: Vec<TopicId>) {
        let current = std::mem::take(&mut self.topic_order);
        self.topic_order = reconcile_order(previous, current);
    }

    /// Puts back a previous sub-topic order, reconciled with current children.
    pub fn restore_sub_topic_order(&mut self, topic_id: &TopicId, previous: Vec<SubTopicId>) {
        if let Some(topic) = self.topics.get_mut(topic_id) {
            let current = std::mem::take(&mut topic.sub_topic_ids);
            topic.sub_topic_ids = reconcile_order(previous, current);
        }
    }

    /// Puts back a previous question order, reconciled with current children.
    pub fn restore_question_order(&mut self, sub_topic_id: &SubTopicId, previous: Vec<QuestionId>) {
        if let Some(sub_topic) = self.sub_topics.get_mut(sub_topic_id) {
            let current = std::mem::take(&mut sub_topic.question_ids);
            sub_topic.question_ids = reconcile_order(previous, current);
        }
    }

    fn drop_question(&mut self, id: &QuestionId) -> Option<Question> {
        let question = self.questions.remove(id)?;
        self.url_index.apply_change(Some(&question), None);
        Some(question)
    }

    fn drop_sub_topic(&mut self, id: &SubTopicId) -> Option<(SubTopic, Vec<Question>)> {
        let sub_topic = self.sub_topics.remove(id)?;
        let questions = sub_topic
            .question_ids
            .iter()
            .filter_map(|question_id| self.drop_question(question_id))
            .collect();
        Some((sub_topic, questions))
    }

    fn adopt_sub_topic(&mut self, mut sub_topic: SubTopic, questions: Vec<Question>) {
        let mut restored = HashSet::new();
        for question in questions {
            if self.questions.contains_key(&question.id) {
                continue;
            }
            self.url_index.apply_change(None, Some(&question));
            restored.insert(question.id.clone());
            self.questions.insert(question.id.clone(), question);
        }
        sub_topic.question_ids.retain(|id| restored.contains(id));
        self.sub_topics.insert(sub_topic.id.clone(), sub_topic);
    }
}

fn insert_clamped<T>(items: &mut Vec<T>, position: usize, value: T) {
    let index = position.min(items.len());
    items.insert(index, value);
}

/// Rejects anything that is not a reordering of exactly `current`.
fn ensure_permutation<T: Eq + Hash>(current: &[T], next: &[T]) -> StoreResult<()> {
    let invalid = || StoreError::InvalidOrder {
        expected_len: current.len(),
        actual_len: next.len(),
    };
    if current.len() != next.len() {
        return Err(invalid());
    }
    let known: HashSet<&T> = current.iter().collect();
    let mut seen = HashSet::with_capacity(next.len());
    for id in next {
        if !known.contains(id) || !seen.insert(id) {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Previous order restricted to ids still present, followed by ids that
/// appeared since, in their current relative order.
fn reconcile_order<T: Eq + Hash + Clone>(previous: Vec<T>, current: Vec<T>) -> Vec<T> {
    let present: HashSet<&T> = current.iter().collect();
    let mut seen = HashSet::with_capacity(current.len());
    let mut order = Vec::with_capacity(current.len());
    for id in previous {
        if present.contains(&id) && seen.insert(id.clone()) {
            order.push(id);
        }
    }
    for id in current {
        if seen.insert(id.clone()) {
            order.push(id);
        }
    }
    order
}
