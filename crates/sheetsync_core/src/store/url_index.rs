//! Secondary index from external problem link to question ids.
//!
//! # Responsibility
//! - Keep `link -> {question ids}` consistent with the question map without a
//!   full rescan per mutation.
//!
//! # Invariants
//! - Keys are never empty strings.
//! - No key maps to an empty set.
//! - Every update is expressed as an `(old link, new link)` delta, so the rule
//!   can be exercised without a surrounding graph.

use crate::model::ids::QuestionId;
use crate::model::question::Question;
use std::collections::{HashMap, HashSet};

/// Derived `problem_url -> question ids` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlIndex {
    entries: HashMap<String, HashSet<QuestionId>>,
}

impl UrlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from scratch with one pass over `questions`.
    pub fn rebuild<'a>(questions: impl IntoIterator<Item = &'a Question>) -> Self {
        let mut index = Self::new();
        for question in questions {
            index.apply_delta(&question.id, None, question.url());
        }
        index
    }

    /// Moves `id` from the `old` key to the `new` key.
    ///
    /// - create: `(None, Some(url))`
    /// - delete: `(Some(url), None)`
    /// - unchanged link: no-op
    pub fn apply_delta(&mut self, id: &QuestionId, old: Option<&str>, new: Option<&str>) {
        let old = old.filter(|url| !url.is_empty());
        let new = new.filter(|url| !url.is_empty());
        if old == new {
            return;
        }
        if let Some(url) = old {
            self.remove(url, id);
        }
        if let Some(url) = new {
            self.entries
                .entry(url.to_string())
                .or_default()
                .insert(id.clone());
        }
    }

    /// Applies the delta between two versions of the same question.
    pub fn apply_change(&mut self, before: Option<&Question>, after: Option<&Question>) {
        let Some(id) = before.or(after).map(|question| &question.id) else {
            return;
        };
        self.apply_delta(
            id,
            before.and_then(Question::url),
            after.and_then(Question::url),
        );
    }

    /// Ids currently holding `url`.
    pub fn ids_for(&self, url: &str) -> Option<&HashSet<QuestionId>> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str, id: &QuestionId) -> bool {
        self.entries.get(url).is_some_and(|ids| ids.contains(id))
    }

    /// Number of distinct links.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<QuestionId>)> {
        self.entries.iter().map(|(url, ids)| (url.as_str(), ids))
    }

    fn remove(&mut self, url: &str, id: &QuestionId) {
        if let Some(ids) = self.entries.get_mut(url) {
            ids.remove(id);
            if ids.is_empty() {
                self.entries.remove(url);
            }
        }
    }
}
