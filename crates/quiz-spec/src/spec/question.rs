use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported question shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    FreeText,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "single_choice",
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::FreeText => "free_text",
        }
    }

    pub fn has_choices(&self) -> bool {
        !matches!(self, QuestionKind::FreeText)
    }
}

/// Format rule applied to free-text answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    #[default]
    Any,
    Email,
}

/// Definition of a single quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default = "required_by_default")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TextFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn required_by_default() -> bool {
    true
}

impl QuestionSpec {
    pub fn single(id: &str, prompt: &str, choices: &[&str]) -> Self {
        Self::with_choices(id, prompt, QuestionKind::SingleChoice, choices)
    }

    pub fn multiple(id: &str, prompt: &str, choices: &[&str]) -> Self {
        Self::with_choices(id, prompt, QuestionKind::MultipleChoice, choices)
    }

    pub fn text(id: &str, prompt: &str, format: TextFormat) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            kind: QuestionKind::FreeText,
            choices: Vec::new(),
            required: true,
            format: Some(format),
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn with_choices(id: &str, prompt: &str, kind: QuestionKind, choices: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            kind,
            choices: choices.iter().map(|choice| choice.to_string()).collect(),
            required: true,
            format: None,
            description: None,
        }
    }

    pub fn has_choice(&self, label: &str) -> bool {
        self.choices.iter().any(|choice| choice == label)
    }

    pub fn text_format(&self) -> TextFormat {
        self.format.unwrap_or_default()
    }
}
