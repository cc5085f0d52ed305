//! Bundled default dataset.
//!
//! # Responsibility
//! - Parse the bundled raw sheet (flat question list tagged with topic and
//!   sub-topic names) into a normalized `SheetData`.
//!
//! # Invariants
//! - Topics and sub-topics appear in first-seen order.
//! - Sub-topics are keyed by `(topic name, sub-topic name)`, so equal
//!   sub-topic names under different topics stay distinct.
//! - Topic and sub-topic ids are minted fresh on every parse; question ids
//!   come from the dataset.

use crate::model::ids::{QuestionId, SubTopicId, TopicId};
use crate::model::question::{Difficulty, Question};
use crate::model::sheet::{Sheet, SheetData, SubTopic, Topic};
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_SHEET_JSON: &str = include_str!("default_sheet.json");

/// Failure to decode a raw sheet document.
#[derive(Debug)]
pub struct SeedError(serde_json::Error);

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid seed sheet: {}", self.0)
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawData {
    sheet: RawSheet,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawSheet {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    banner: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(rename = "_id")]
    id: Option<String>,
    title: String,
    topic: String,
    sub_topic: String,
    #[serde(default)]
    resource: Option<String>,
    #[serde(default)]
    is_solved: bool,
    #[serde(default)]
    question_id: Option<RawProblem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProblem {
    name: Option<String>,
    difficulty: Option<String>,
    platform: Option<String>,
    problem_url: Option<String>,
}

/// Parses the bundled default sheet.
pub fn default_sheet() -> Result<SheetData, SeedError> {
    parse_sheet(DEFAULT_SHEET_JSON)
}

/// Parses a raw sheet document into normalized form.
pub fn parse_sheet(json: &str) -> Result<SheetData, SeedError> {
    let document: RawDocument = serde_json::from_str(json).map_err(SeedError)?;
    let RawData { sheet, questions } = document.data;

    let mut data = SheetData {
        sheet: Sheet {
            id: sheet.id,
            name: sheet.name,
            description: sheet.description,
            slug: sheet.slug,
            banner: sheet.banner,
        },
        ..SheetData::default()
    };
    let mut topic_ids: HashMap<String, TopicId> = HashMap::new();
    let mut sub_topic_ids: HashMap<(String, String), SubTopicId> = HashMap::new();

    for raw in questions {
        let topic_id = topic_ids
            .entry(raw.topic.clone())
            .or_insert_with(|| {
                let id = TopicId::generate();
                data.topics
                    .insert(id.clone(), Topic::new(id.clone(), raw.topic.clone()));
                data.topic_order.push(id.clone());
                id
            })
            .clone();

        let sub_topic_id = sub_topic_ids
            .entry((raw.topic.clone(), raw.sub_topic.clone()))
            .or_insert_with(|| {
                let id = SubTopicId::generate();
                data.sub_topics
                    .insert(id.clone(), SubTopic::new(id.clone(), raw.sub_topic.clone()));
                if let Some(topic) = data.topics.get_mut(&topic_id) {
                    topic.sub_topic_ids.push(id.clone());
                }
                id
            })
            .clone();

        let question_id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .map(QuestionId::new)
            .unwrap_or_else(QuestionId::generate);
        if data.questions.contains_key(&question_id) {
            continue;
        }
        let problem = raw.question_id.unwrap_or_default();
        let question = Question {
            id: question_id.clone(),
            question_name: problem.name.unwrap_or_else(|| raw.title.clone()),
            title: raw.title,
            difficulty: problem
                .difficulty
                .as_deref()
                .map_or(Difficulty::Medium, Difficulty::parse_lenient),
            platform: problem.platform.unwrap_or_default(),
            problem_url: problem.problem_url.filter(|url| !url.trim().is_empty()),
            resource: raw.resource.filter(|resource| !resource.trim().is_empty()),
            is_solved: raw.is_solved,
            is_duplicate: false,
        };
        data.questions.insert(question_id.clone(), question);
        if let Some(sub_topic) = data.sub_topics.get_mut(&sub_topic_id) {
            sub_topic.question_ids.push(question_id);
        }
    }

    Ok(data)
}
