//! Solved/total counters for the sheet, each topic and each sub-topic.

use super::SheetState;
use crate::model::ids::{SubTopicId, TopicId};
use std::collections::HashMap;

/// Solved count out of a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub solved: usize,
    pub total: usize,
}

impl Progress {
    fn count(&mut self, solved: bool) {
        self.total += 1;
        if solved {
            self.solved += 1;
        }
    }

    /// Whole-number completion percentage; `0` for an empty group.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.solved * 100 + self.total / 2) / self.total) as u8
    }
}

/// Progress per tier of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetProgress {
    pub sheet: Progress,
    pub topics: HashMap<TopicId, Progress>,
    pub sub_topics: HashMap<SubTopicId, Progress>,
}

impl SheetState {
    /// Counts solved questions with one in-order walk.
    pub fn progress(&self) -> SheetProgress {
        let mut progress = SheetProgress::default();
        for topic in self.topics_in_order() {
            progress.topics.entry(topic.id.clone()).or_default();
            for sub_topic in self.sub_topics_of(topic) {
                progress.sub_topics.entry(sub_topic.id.clone()).or_default();
            }
        }
        for (topic, sub_topic, question) in self.walk() {
            progress.sheet.count(question.is_solved);
            if let Some(entry) = progress.topics.get_mut(&topic.id) {
                entry.count(question.is_solved);
            }
            if let Some(entry) = progress.sub_topics.get_mut(&sub_topic.id) {
                entry.count(question.is_solved);
            }
        }
        progress
    }
}

#[cfg(test)]
mod tests {
    use super::Progress;

    #[test]
    fn percent_rounds_and_handles_empty_groups() {
        assert_eq!(Progress::default().percent(), 0);
        assert_eq!(Progress { solved: 1, total: 3 }.percent(), 33);
        assert_eq!(Progress { solved: 2, total: 3 }.percent(), 67);
        assert_eq!(Progress { solved: 4, total: 4 }.percent(), 100);
    }
}
