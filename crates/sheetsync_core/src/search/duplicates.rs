//! Duplicate-link lookup.
//!
//! Two paths produce the same output: `find_duplicates` consults the link
//! index first and only walks the graph when some other question holds the
//! link; `scan_duplicates` is the plain graph walk.

use crate::model::ids::QuestionId;
use crate::store::SheetState;
use std::collections::HashSet;

/// Where another question holding the same link lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateLocation {
    pub question_id: QuestionId,
    pub title: String,
    pub topic_name: String,
    pub sub_topic_name: String,
}

/// Locations of every question other than `exclude` whose link equals
/// `problem_url`, in topic → sub-topic → question order.
///
/// The candidate link is trimmed first, as stored links are.
pub fn find_duplicates(
    state: &SheetState,
    problem_url: &str,
    exclude: Option<&QuestionId>,
) -> Vec<DuplicateLocation> {
    let problem_url = problem_url.trim();
    if problem_url.is_empty() {
        return Vec::new();
    }
    let Some(holders) = state.url_index().ids_for(problem_url) else {
        return Vec::new();
    };
    let candidates: HashSet<&QuestionId> = holders
        .iter()
        .filter(|id| Some(*id) != exclude)
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut locations = Vec::with_capacity(candidates.len());
    for (topic, sub_topic, question) in state.walk() {
        if !candidates.contains(&question.id) {
            continue;
        }
        locations.push(DuplicateLocation {
            question_id: question.id.clone(),
            title: question.title.clone(),
            topic_name: topic.name.clone(),
            sub_topic_name: sub_topic.name.clone(),
        });
        if locations.len() == candidates.len() {
            break;
        }
    }
    locations
}

/// Reference implementation: walks the whole graph without the index.
pub fn scan_duplicates(
    state: &SheetState,
    problem_url: &str,
    exclude: Option<&QuestionId>,
) -> Vec<DuplicateLocation> {
    let problem_url = problem_url.trim();
    if problem_url.is_empty() {
        return Vec::new();
    }
    state
        .walk()
        .filter(|(_, _, question)| Some(&question.id) != exclude)
        .filter(|(_, _, question)| question.url() == Some(problem_url))
        .map(|(topic, sub_topic, question)| DuplicateLocation {
            question_id: question.id.clone(),
            title: question.title.clone(),
            topic_name: topic.name.clone(),
            sub_topic_name: sub_topic.name.clone(),
        })
        .collect()
}
