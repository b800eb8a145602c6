use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::spec::{Catalog, QuestionKind, QuestionSpec};
use crate::validate::{self, check_answer};

/// A stored answer: one label or free-text string, or a set of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(BTreeSet<String>),
}

impl AnswerValue {
    pub fn one(value: impl Into<String>) -> Self {
        AnswerValue::One(value.into())
    }

    pub fn many<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Many(labels.into_iter().map(Into::into).collect())
    }

    pub fn as_one(&self) -> Option<&str> {
        match self {
            AnswerValue::One(value) => Some(value),
            AnswerValue::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&BTreeSet<String>> {
        match self {
            AnswerValue::Many(labels) => Some(labels),
            AnswerValue::One(_) => None,
        }
    }

    /// True when the value holds `label`, either as the single value or inside the set.
    pub fn contains(&self, label: &str) -> bool {
        match self {
            AnswerValue::One(value) => value == label,
            AnswerValue::Many(labels) => labels.contains(label),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::One(value) => value.trim().is_empty(),
            AnswerValue::Many(labels) => labels.is_empty(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AnswerValue::One(value) => Value::String(value.clone()),
            AnswerValue::Many(labels) => {
                Value::Array(labels.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// Validation error metadata reported for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Error)]
#[error("{message}")]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ValidationError {
    pub fn for_question(question_id: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            question_id: Some(question_id.to_string()),
            path: Some(format!("/{}", question_id)),
            message: message.into(),
            code: Some(code.to_string()),
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Result returned from `validate_answers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<String>,
}

/// Mapping from question id to the user's current answer.
///
/// Absent keys mean "unanswered". Every write goes through the owning
/// question's spec so stored labels always belong to that question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerStore {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the answer for `question` after checking its shape.
    pub fn set(&mut self, question: &QuestionSpec, value: AnswerValue) -> Result<(), ValidationError> {
        if let Some(error) = validate::validate_value(question, &value) {
            return Err(error);
        }
        self.values.insert(question.id.clone(), value);
        Ok(())
    }

    /// Flips `label` in a multiple-choice answer and returns whether it is now selected.
    pub fn toggle(&mut self, question: &QuestionSpec, label: &str) -> Result<bool, ValidationError> {
        if question.kind != QuestionKind::MultipleChoice {
            return Err(ValidationError::for_question(
                &question.id,
                format!("'{}' is not a multiple-choice question", question.id),
                "type_mismatch",
            ));
        }
        if !question.has_choice(label) {
            return Err(invalid_choice(question, label));
        }

        let mut labels = match self.values.remove(&question.id) {
            Some(AnswerValue::Many(labels)) => labels,
            _ => BTreeSet::new(),
        };
        let selected = if labels.remove(label) {
            false
        } else {
            labels.insert(label.to_string());
            true
        };
        self.values
            .insert(question.id.clone(), AnswerValue::Many(labels));
        Ok(selected)
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.values.get(question_id)
    }

    /// Single-valued answer as text, `None` when unanswered or multi-valued.
    pub fn text(&self, question_id: &str) -> Option<&str> {
        self.get(question_id).and_then(AnswerValue::as_one)
    }

    pub fn contains(&self, question_id: &str, label: &str) -> bool {
        self.get(question_id)
            .map(|value| value.contains(label))
            .unwrap_or(false)
    }

    pub fn remove(&mut self, question_id: &str) -> Option<AnswerValue> {
        self.values.remove(question_id)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_complete(&self, question: &QuestionSpec) -> bool {
        self.check(question).is_ok()
    }

    /// Explains why `question` is not yet complete.
    pub fn check(&self, question: &QuestionSpec) -> Result<(), ValidationError> {
        check_answer(question, self.get(&question.id))
    }

    /// Rebuilds a store from persisted values, dropping anything the catalog does not know.
    pub fn restore(catalog: &Catalog, raw: BTreeMap<String, AnswerValue>) -> Self {
        let mut store = Self::new();
        for (question_id, value) in raw {
            let Some(question) = catalog.question(&question_id) else {
                warn!(question_id = %question_id, "dropping answer for unknown question");
                continue;
            };
            if let Err(error) = store.set(question, value) {
                warn!(
                    question_id = %question_id,
                    code = error.code().unwrap_or("invalid"),
                    "dropping persisted answer that no longer fits its question"
                );
            }
        }
        store
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values
            .iter()
            .map(|(question_id, value)| (question_id.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, AnswerValue> {
        &self.values
    }

    pub fn into_map(self) -> BTreeMap<String, AnswerValue> {
        self.values
    }

    /// Answers as a flat JSON object keyed by question id.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(question_id, value)| (question_id.clone(), value.to_json()))
            .collect()
    }
}

pub(crate) fn invalid_choice(question: &QuestionSpec, label: &str) -> ValidationError {
    ValidationError::for_question(
        &question.id,
        format!("'{}' is not a choice of '{}'", label, question.id),
        "invalid_choice",
    )
}
