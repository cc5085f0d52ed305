//! Reorder entry points for the three ordered sequences.
//!
//! Each takes a full replacement permutation, applies it locally, persists it
//! and puts the previous order back when the remote call fails. The `move_*`
//! variants derive that permutation from a drag's source and target index.

use super::notice::Operation;
use super::sheet_service::{SheetService, SyncResult};
use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::remote::SheetPersistence;
use crate::store::mutation::Mutation;
use crate::store::StoreError;

impl<P: SheetPersistence> SheetService<P> {
    pub async fn reorder_topics(&self, order: Vec<TopicId>) -> SyncResult<()> {
        let mutation = Mutation::ReorderTopics {
            order: order.clone(),
        };
        self.commit(
            Operation::ReorderTopics,
            mutation,
            self.remote().reorder_topics(&order),
        )
        .await
    }

    pub async fn reorder_sub_topics(
        &self,
        topic_id: &TopicId,
        order: Vec<SubTopicId>,
    ) -> SyncResult<()> {
        let mutation = Mutation::ReorderSubTopics {
            topic_id: topic_id.clone(),
            order: order.clone(),
        };
        self.commit(
            Operation::ReorderSubTopics,
            mutation,
            self.remote().reorder_sub_topics(topic_id, &order),
        )
        .await
    }

    pub async fn reorder_questions(
        &self,
        sub_topic_id: &SubTopicId,
        order: Vec<QuestionId>,
    ) -> SyncResult<()> {
        let mutation = Mutation::ReorderQuestions {
            sub_topic_id: sub_topic_id.clone(),
            order: order.clone(),
        };
        self.commit(
            Operation::ReorderQuestions,
            mutation,
            self.remote().reorder_questions(sub_topic_id, &order),
        )
        .await
    }

    /// Moves the topic at `from` to `to`. Equal positions do nothing.
    pub async fn move_topic(&self, from: usize, to: usize) -> SyncResult<()> {
        let order = self.ensure(Operation::ReorderTopics, |state| {
            moved(state.topic_order(), from, to)
        })?;
        match order {
            Some(order) => self.reorder_topics(order).await,
            None => Ok(()),
        }
    }

    pub async fn move_sub_topic(&self, topic_id: &TopicId, from: usize, to: usize) -> SyncResult<()> {
        let order = self.ensure(Operation::ReorderSubTopics, |state| {
            let topic = state
                .topic(topic_id)
                .ok_or_else(|| StoreError::TopicNotFound(topic_id.clone()))?;
            moved(&topic.sub_topic_ids, from, to)
        })?;
        match order {
            Some(order) => self.reorder_sub_topics(topic_id, order).await,
            None => Ok(()),
        }
    }

    pub async fn move_question(
        &self,
        sub_topic_id: &SubTopicId,
        from: usize,
        to: usize,
    ) -> SyncResult<()> {
        let order = self.ensure(Operation::ReorderQuestions, |state| {
            let sub_topic = state
                .sub_topic(sub_topic_id)
                .ok_or_else(|| StoreError::SubTopicNotFound(sub_topic_id.clone()))?;
            moved(&sub_topic.question_ids, from, to)
        })?;
        match order {
            Some(order) => self.reorder_questions(sub_topic_id, order).await,
            None => Ok(()),
        }
    }
}

/// `items` with the element at `from` moved to `to`; `None` when the
/// positions are equal.
pub fn moved<T: Clone>(items: &[T], from: usize, to: usize) -> Result<Option<Vec<T>>, StoreError> {
    let len = items.len();
    for position in [from, to] {
        if position >= len {
            return Err(StoreError::PositionOutOfRange { position, len });
        }
    }
    if from == to {
        return Ok(None);
    }
    let mut order = items.to_vec();
    let item = order.remove(from);
    order.insert(to, item);
    Ok(Some(order))
}

#[cfg(test)]
mod tests {
    use super::moved;
    use crate::store::StoreError;

    #[test]
    fn moved_shifts_the_items_in_between() {
        let items = ["a", "b", "c", "d"];
        assert_eq!(moved(&items, 0, 2).unwrap(), Some(vec!["b", "c", "a", "d"]));
        assert_eq!(moved(&items, 3, 1).unwrap(), Some(vec!["a", "d", "b", "c"]));
        assert_eq!(moved(&items, 1, 1).unwrap(), None);
    }

    #[test]
    fn moved_rejects_out_of_range_positions() {
        assert_eq!(
            moved(&["a"], 0, 1),
            Err(StoreError::PositionOutOfRange {
                position: 1,
                len: 1
            })
        );
    }
}
