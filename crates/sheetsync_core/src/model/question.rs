//! Question record and its write-side inputs.
//!
//! # Responsibility
//! - Define the canonical question shape and difficulty enum.
//! - Normalize create/update inputs before they reach the store.
//!
//! # Invariants
//! - `title` is never blank for a stored question.
//! - `problem_url`/`resource` are `None` instead of blank strings.

use crate::model::ids::QuestionId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Difficulty label shown next to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    /// Explicitly cleared by the user while editing.
    Unmarked,
    /// Not chosen when the question was added.
    Neutral,
}

impl Difficulty {
    /// Parses a free-form label, falling back to `Medium` for unknown input.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            "unmarked" => Self::Unmarked,
            "neutral" => Self::Neutral,
            _ => Self::Medium,
        }
    }
}

/// Input validation failures for names and titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Topic or sub-topic name is blank after trim.
    BlankName,
    /// Question title is blank after trim.
    BlankTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::BlankTitle => write!(f, "question title must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Canonical question record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    /// Canonical problem name; defaults to the title.
    #[serde(default)]
    pub question_name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub platform: String,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub problem_url: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub resource: Option<String>,
    #[serde(default)]
    pub is_solved: bool,
    /// User-settable override, independent of link sharing.
    #[serde(default)]
    pub is_duplicate: bool,
}

impl Question {
    /// Builds a fresh question from a validated draft.
    pub fn from_draft(id: QuestionId, draft: &QuestionDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            question_name: draft.title.clone(),
            difficulty: draft.difficulty,
            platform: String::new(),
            problem_url: draft.problem_url.clone(),
            resource: draft.resource.clone(),
            is_solved: false,
            is_duplicate: false,
        }
    }

    /// Non-empty external problem link, if any.
    pub fn url(&self) -> Option<&str> {
        self.problem_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Returns a copy with `patch` applied. The id never changes.
    pub fn patched(&self, patch: &QuestionPatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(name) = &patch.question_name {
            next.question_name = name.clone();
        }
        if let Some(difficulty) = patch.difficulty {
            next.difficulty = difficulty;
        }
        if let Some(platform) = &patch.platform {
            next.platform = platform.clone();
        }
        if let Some(url) = &patch.problem_url {
            next.problem_url = non_blank(url);
        }
        if let Some(resource) = &patch.resource {
            next.resource = non_blank(resource);
        }
        if let Some(solved) = patch.is_solved {
            next.is_solved = solved;
        }
        if let Some(duplicate) = patch.is_duplicate {
            next.is_duplicate = duplicate;
        }
        next
    }
}

/// Create input for a new question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub title: String,
    pub problem_url: Option<String>,
    pub resource: Option<String>,
    pub difficulty: Difficulty,
}

impl QuestionDraft {
    /// Creates a draft with only a title; difficulty defaults to `Neutral`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            problem_url: None,
            resource: None,
            difficulty: Difficulty::Neutral,
        }
    }

    pub fn with_problem_url(mut self, url: impl Into<String>) -> Self {
        self.problem_url = Some(url.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Trims every field and rejects a blank title.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(Self {
            title: title.to_string(),
            problem_url: self.problem_url.as_deref().and_then(non_blank),
            resource: self.resource.as_deref().and_then(non_blank),
            difficulty: self.difficulty,
        })
    }
}

/// Partial question update. `None` fields are left untouched.
///
/// A blank `problem_url`/`resource` clears the stored link.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_solved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_duplicate: Option<bool>,
}

impl QuestionPatch {
    /// Patch that only flips the solved flag.
    pub fn solved(value: bool) -> Self {
        Self {
            is_solved: Some(value),
            ..Self::default()
        }
    }

    /// Trims text fields and rejects a blank title.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let title = match self.title.as_deref().map(str::trim) {
            Some("") => return Err(ValidationError::BlankTitle),
            other => other.map(str::to_string),
        };
        Ok(Self {
            title,
            question_name: self.question_name.as_deref().map(|v| v.trim().to_string()),
            difficulty: self.difficulty,
            platform: self.platform.as_deref().map(|v| v.trim().to_string()),
            problem_url: self.problem_url.as_deref().map(|v| v.trim().to_string()),
            resource: self.resource.as_deref().map(|v| v.trim().to_string()),
            is_solved: self.is_solved,
            is_duplicate: self.is_duplicate,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Trims a name and rejects it when blank.
pub fn normalize_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

mod de {
    use serde::{Deserialize, Deserializer};

    pub(super) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|v| !v.trim().is_empty()))
    }
}
