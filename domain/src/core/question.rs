//! Question value object

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many options a question expects to be chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Exactly one option is correct
    #[default]
    SingleChoice,
    /// One or more options may be correct
    MultiSelect,
    /// The answer is `true` or `false`
    TrueFalse,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "single-choice",
            QuestionKind::MultiSelect => "multi-select",
            QuestionKind::TrueFalse => "true-false",
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "single" | "single-choice" => Ok(QuestionKind::SingleChoice),
            "multi" | "multiple" | "multi-select" => Ok(QuestionKind::MultiSelect),
            "true-false" | "truefalse" | "boolean" | "tf" => Ok(QuestionKind::TrueFalse),
            other => Err(format!(
                "Unknown question kind: {}. Valid: single, multi, true-false",
                other
            )),
        }
    }
}

/// A labelled answer option (e.g. `A. Paris`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub text: String,
}

impl AnswerOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Image attached to a question.
///
/// The bytes are opaque to the engine; only provider adapters encode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionImage {
    data: Arc<[u8]>,
    mime_type: String,
}

impl QuestionImage {
    pub fn new(data: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An exam question to be answered by the ensemble (Value Object)
///
/// Immutable once built. The builder-style `with_*` methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    text: String,
    #[serde(default)]
    options: Vec<AnswerOption>,
    #[serde(default)]
    kind: QuestionKind,
    #[serde(skip)]
    image: Option<QuestionImage>,
}

impl Question {
    /// Create a new question
    ///
    /// # Panics
    /// Panics if the text is empty or only whitespace
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        assert!(!text.trim().is_empty(), "Question cannot be empty");
        Self {
            text,
            options: Vec::new(),
            kind: QuestionKind::default(),
            image: None,
        }
    }

    /// Try to create a new question, returning None if invalid
    pub fn try_new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self {
                text,
                options: Vec::new(),
                kind: QuestionKind::default(),
                image: None,
            })
        }
    }

    pub fn with_option(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.options.push(AnswerOption::new(label, text));
        self
    }

    pub fn with_options(mut self, options: Vec<AnswerOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_kind(mut self, kind: QuestionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_image(mut self, image: QuestionImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn image(&self) -> Option<&QuestionImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}
