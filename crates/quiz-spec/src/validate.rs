use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::answers::{AnswerStore, AnswerValue, ValidationError, ValidationResult, invalid_choice};
use crate::spec::{Catalog, QuestionKind, QuestionSpec, TextFormat};

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub fn validate_answers(catalog: &Catalog, answers: &AnswerStore) -> ValidationResult {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for question in catalog.questions() {
        match answers.get(&question.id) {
            None => {
                if question.required {
                    missing_required.push(question.id.clone());
                }
            }
            Some(value) => {
                if let Err(error) = check_answer(question, Some(value)) {
                    if error.code() == Some("required") {
                        missing_required.push(question.id.clone());
                    } else {
                        errors.push(error);
                    }
                }
            }
        }
    }

    let all_ids: BTreeSet<_> = catalog
        .questions()
        .iter()
        .map(|question| question.id.as_str())
        .collect();
    let unknown_fields: Vec<String> = answers
        .iter()
        .map(|(question_id, _)| question_id)
        .filter(|question_id| !all_ids.contains(question_id))
        .map(str::to_string)
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

/// Completeness check for one question: required answers present and well-formed.
pub fn check_answer(
    question: &QuestionSpec,
    value: Option<&AnswerValue>,
) -> Result<(), ValidationError> {
    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ => {
            if question.required {
                return Err(ValidationError::for_question(
                    &question.id,
                    "please answer this question before continuing",
                    "required",
                ));
            }
            return Ok(());
        }
    };

    if let Some(error) = validate_value(question, value) {
        return Err(error);
    }

    if question.kind == QuestionKind::FreeText
        && question.text_format() == TextFormat::Email
        && let Some(text) = value.as_one()
        && !is_valid_email(text)
    {
        return Err(ValidationError::for_question(
            &question.id,
            "please enter a valid email address",
            "invalid_email",
        ));
    }

    Ok(())
}

/// Shape check applied on every write: kind match and known labels.
pub(crate) fn validate_value(question: &QuestionSpec, value: &AnswerValue) -> Option<ValidationError> {
    if !matches_kind(question, value) {
        return Some(ValidationError::for_question(
            &question.id,
            format!(
                "answer does not fit a {} question",
                question.kind.as_str().replace('_', " ")
            ),
            "type_mismatch",
        ));
    }

    match value {
        AnswerValue::One(label) if question.kind == QuestionKind::SingleChoice => {
            if !question.has_choice(label) {
                return Some(invalid_choice(question, label));
            }
        }
        AnswerValue::Many(labels) => {
            if let Some(label) = labels.iter().find(|label| !question.has_choice(label)) {
                return Some(invalid_choice(question, label));
            }
        }
        AnswerValue::One(_) => {}
    }

    None
}

fn matches_kind(question: &QuestionSpec, value: &AnswerValue) -> bool {
    match question.kind {
        QuestionKind::SingleChoice | QuestionKind::FreeText => {
            matches!(value, AnswerValue::One(_))
        }
        QuestionKind::MultipleChoice => matches!(value, AnswerValue::Many(_)),
    }
}

pub fn is_valid_email(text: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text.trim()))
}
