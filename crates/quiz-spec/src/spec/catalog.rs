use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::question::QuestionSpec;

/// Wire and file representation of a question catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogSpec {
    pub id: String,
    pub version: String,
    pub questions: Vec<QuestionSpec>,
}

/// Errors raised when a catalog breaks its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog '{0}' has no questions")]
    Empty(String),
    #[error("duplicate question id '{0}'")]
    DuplicateId(String),
    #[error("question '{0}' needs at least one choice")]
    MissingChoices(String),
    #[error("question '{question_id}' lists choice '{label}' more than once")]
    DuplicateChoice { question_id: String, label: String },
    #[error("free-text question '{0}' must not declare choices")]
    UnexpectedChoices(String),
}

/// Ordered, validated sequence of questions.
///
/// Built only through [`Catalog::new`], so every instance upholds unique ids
/// and non-empty choice sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    spec: CatalogSpec,
}

impl Catalog {
    pub fn new(spec: CatalogSpec) -> Result<Self, CatalogError> {
        if spec.questions.is_empty() {
            return Err(CatalogError::Empty(spec.id.clone()));
        }

        let mut ids = BTreeSet::new();
        for question in &spec.questions {
            if !ids.insert(question.id.as_str()) {
                return Err(CatalogError::DuplicateId(question.id.clone()));
            }

            if question.kind.has_choices() {
                if question.choices.is_empty() {
                    return Err(CatalogError::MissingChoices(question.id.clone()));
                }
                let mut labels = BTreeSet::new();
                for label in &question.choices {
                    if !labels.insert(label.as_str()) {
                        return Err(CatalogError::DuplicateChoice {
                            question_id: question.id.clone(),
                            label: label.clone(),
                        });
                    }
                }
            } else if !question.choices.is_empty() {
                return Err(CatalogError::UnexpectedChoices(question.id.clone()));
            }
        }

        Ok(Self { spec })
    }

    /// Wraps a spec whose invariants are checked by this crate's tests.
    pub(crate) fn from_trusted(spec: CatalogSpec) -> Self {
        Self { spec }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn version(&self) -> &str {
        &self.spec.version
    }

    /// Question at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index >= self.len()`; callers own the index bounds.
    pub fn at(&self, index: usize) -> &QuestionSpec {
        match self.spec.questions.get(index) {
            Some(question) => question,
            None => panic!(
                "catalog '{}' index {} out of range (len {})",
                self.spec.id,
                index,
                self.spec.questions.len()
            ),
        }
    }

    pub fn get(&self, index: usize) -> Option<&QuestionSpec> {
        self.spec.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.spec.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spec.questions.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.len() - 1
    }

    pub fn question(&self, id: &str) -> Option<&QuestionSpec> {
        self.spec.questions.iter().find(|question| question.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.spec.questions.iter().position(|question| question.id == id)
    }

    pub fn questions(&self) -> &[QuestionSpec] {
        &self.spec.questions
    }

    pub fn spec(&self) -> &CatalogSpec {
        &self.spec
    }
}

impl TryFrom<CatalogSpec> for Catalog {
    type Error = CatalogError;

    fn try_from(spec: CatalogSpec) -> Result<Self, Self::Error> {
        Catalog::new(spec)
    }
}
