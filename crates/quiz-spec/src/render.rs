use serde_json::{Value, json};

use crate::answers::{AnswerStore, AnswerValue, ValidationError};
use crate::classify::HairProfile;
use crate::progress::QuizState;
use crate::spec::{Catalog, QuestionKind};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// The current question still needs an answer.
    NeedInput,
    /// The current question is answered and the quiz can move on.
    Ready,
    /// Every question is answered and the run is finished.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Ready => "ready",
            RenderStatus::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderChoice {
    pub label: String,
    pub selected: bool,
}

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderQuestion {
    pub id: String,
    pub prompt: String,
    pub description: Option<String>,
    pub kind: QuestionKind,
    pub required: bool,
    pub choices: Vec<RenderChoice>,
    pub current_text: Option<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPayload {
    pub catalog_id: String,
    pub catalog_version: String,
    pub status: RenderStatus,
    pub index: usize,
    pub total: usize,
    pub progress_percent: u8,
    pub question: Option<RenderQuestion>,
    pub can_retreat: bool,
    pub can_advance: bool,
    pub is_last: bool,
    pub error: Option<ValidationError>,
}

/// Build the renderer payload from the catalog, answers and current position.
pub fn build_render_payload(
    catalog: &Catalog,
    answers: &AnswerStore,
    state: &QuizState,
    last_error: Option<&ValidationError>,
) -> RenderPayload {
    let total = catalog.len();

    let Some(index) = state.index() else {
        return RenderPayload {
            catalog_id: catalog.id().to_string(),
            catalog_version: catalog.version().to_string(),
            status: RenderStatus::Complete,
            index: catalog.last_index(),
            total,
            progress_percent: 100,
            question: None,
            can_retreat: true,
            can_advance: false,
            is_last: true,
            error: last_error.cloned(),
        };
    };

    let question = catalog.at(index);
    let current = answers.get(&question.id);
    let complete = answers.is_complete(question);

    let choices = question
        .choices
        .iter()
        .map(|label| RenderChoice {
            label: label.clone(),
            selected: current.map(|value| value.contains(label)).unwrap_or(false),
        })
        .collect();
    let current_text = match (question.kind, current) {
        (QuestionKind::FreeText, Some(AnswerValue::One(text))) => Some(text.clone()),
        _ => None,
    };

    RenderPayload {
        catalog_id: catalog.id().to_string(),
        catalog_version: catalog.version().to_string(),
        status: if complete {
            RenderStatus::Ready
        } else {
            RenderStatus::NeedInput
        },
        index,
        total,
        progress_percent: percent(index + 1, total),
        question: Some(RenderQuestion {
            id: question.id.clone(),
            prompt: question.prompt.clone(),
            description: question.description.clone(),
            kind: question.kind,
            required: question.required,
            choices,
            current_text,
        }),
        can_retreat: index > 0,
        can_advance: complete,
        is_last: index == catalog.last_index(),
        error: last_error.cloned(),
    }
}

fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part.min(total) * 100) / total) as u8
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let question = payload.question.as_ref().map(|question| {
        json!({
            "id": question.id,
            "prompt": question.prompt,
            "description": question.description,
            "type": question.kind.as_str(),
            "required": question.required,
            "choices": question
                .choices
                .iter()
                .map(|choice| json!({ "label": choice.label, "selected": choice.selected }))
                .collect::<Vec<_>>(),
            "current_text": question.current_text,
        })
    });
    let error = payload.error.as_ref().map(|error| {
        json!({
            "question_id": error.question_id,
            "message": error.message,
            "code": error.code,
        })
    });

    json!({
        "catalog_id": payload.catalog_id,
        "catalog_version": payload.catalog_version,
        "status": payload.status.as_str(),
        "progress": {
            "index": payload.index,
            "total": payload.total,
            "percent": payload.progress_percent,
        },
        "question": question,
        "navigation": {
            "can_retreat": payload.can_retreat,
            "can_advance": payload.can_advance,
            "is_last": payload.is_last,
        },
        "error": error,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();

    let Some(question) = &payload.question else {
        lines.push(format!(
            "Quiz {} complete ({}/{})",
            payload.catalog_id, payload.total, payload.total
        ));
        return lines.join("\n");
    };

    lines.push(format!(
        "Question {} of {} ({}%)",
        payload.index + 1,
        payload.total,
        payload.progress_percent
    ));
    lines.push(question.prompt.clone());
    if let Some(description) = &question.description {
        lines.push(format!("  {}", description));
    }

    match question.kind {
        QuestionKind::FreeText => {
            lines.push(format!(
                "  Answer: {}",
                question.current_text.as_deref().unwrap_or("")
            ));
        }
        QuestionKind::SingleChoice | QuestionKind::MultipleChoice => {
            let (on, off) = if question.kind == QuestionKind::SingleChoice {
                ("(*)", "( )")
            } else {
                ("[x]", "[ ]")
            };
            for choice in &question.choices {
                let mark = if choice.selected { on } else { off };
                lines.push(format!("  {} {}", mark, choice.label));
            }
        }
    }
    if !question.required {
        lines.push("  (optional)".to_string());
    }

    if let Some(error) = &payload.error {
        lines.push(format!("Error: {}", error.message));
    }
    lines.push(format!("Status: {}", payload.status.as_str()));

    lines.join("\n")
}

/// Render a classified profile as plain text.
pub fn render_profile_text(profile: &HairProfile) -> String {
    let mut lines = vec![
        format!("Hair type: {} ({})", profile.hair_type.description, profile.hair_type.code),
        format!("Porosity: {}", profile.porosity.description()),
        format!("Scalp: {}", profile.scalp_type.description()),
        format!(
            "Damage: {} (score {})",
            profile.damage_level.description(),
            profile.damage_score
        ),
        format!("Wash frequency: {}", profile.wash_frequency),
        String::new(),
        profile.advice.trim_end().to_string(),
        String::new(),
        "Recommended products:".to_string(),
    ];

    let products = &profile.recommended_products;
    for (category, items) in [
        ("Shampoo", &products.shampoo),
        ("Conditioner", &products.conditioner),
        ("Treatment", &products.treatment),
    ] {
        for product in items {
            lines.push(format!(
                " - {}: {} by {} ({:.2} {})",
                category, product.name, product.brand, product.price, product.currency
            ));
        }
    }

    lines.join("\n")
}
