//! Hierarchical search filter with match propagation.
//!
//! # Invariants
//! - A blank query means "no filtering" and yields `None`.
//! - A matching topic makes its whole subtree visible; a matching sub-topic
//!   makes its owner and its questions visible; a matching question makes its
//!   owners visible.
//! - `total_matches` counts direct matches only, never propagated visibility.

use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::store::SheetState;
use std::collections::HashSet;

/// Visibility and direct-match sets for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMatches {
    pub visible_topic_ids: HashSet<TopicId>,
    pub visible_sub_topic_ids: HashSet<SubTopicId>,
    pub visible_question_ids: HashSet<QuestionId>,
    pub topic_direct_matches: HashSet<TopicId>,
    pub sub_topic_direct_matches: HashSet<SubTopicId>,
    pub question_direct_matches: HashSet<QuestionId>,
    pub total_matches: usize,
}

/// Computes which nodes stay visible for `query`.
///
/// Matching is case-insensitive substring containment on topic name,
/// sub-topic name and question title. Ids that do not resolve are skipped.
pub fn filter(state: &SheetState, query: &str) -> Option<SearchMatches> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let matches_text = |text: &str| text.to_lowercase().contains(needle.as_str());

    let mut result = SearchMatches::default();
    for topic_id in state.topic_order() {
        let Some(topic) = state.topic(topic_id) else {
            continue;
        };

        if matches_text(&topic.name) {
            result.topic_direct_matches.insert(topic_id.clone());
            result.visible_topic_ids.insert(topic_id.clone());
            for sub_topic_id in &topic.sub_topic_ids {
                result.visible_sub_topic_ids.insert(sub_topic_id.clone());
                if let Some(sub_topic) = state.sub_topic(sub_topic_id) {
                    result
                        .visible_question_ids
                        .extend(sub_topic.question_ids.iter().cloned());
                }
            }
        }

        for sub_topic_id in &topic.sub_topic_ids {
            let Some(sub_topic) = state.sub_topic(sub_topic_id) else {
                continue;
            };

            if matches_text(&sub_topic.name) {
                result.sub_topic_direct_matches.insert(sub_topic_id.clone());
                result.visible_topic_ids.insert(topic_id.clone());
                result.visible_sub_topic_ids.insert(sub_topic_id.clone());
                result
                    .visible_question_ids
                    .extend(sub_topic.question_ids.iter().cloned());
            }

            for question_id in &sub_topic.question_ids {
                let Some(question) = state.question(question_id) else {
                    continue;
                };
                if matches_text(&question.title) {
                    result.question_direct_matches.insert(question_id.clone());
                    result.visible_topic_ids.insert(topic_id.clone());
                    result.visible_sub_topic_ids.insert(sub_topic_id.clone());
                    result.visible_question_ids.insert(question_id.clone());
                }
            }
        }
    }

    result.total_matches = result.topic_direct_matches.len()
        + result.sub_topic_direct_matches.len()
        + result.question_direct_matches.len();
    Some(result)
}
