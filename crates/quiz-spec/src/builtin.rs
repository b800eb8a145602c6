//! Built-in ten-question catalog used when the backend cannot serve one.

use once_cell::sync::Lazy;

use crate::spec::{Catalog, CatalogSpec, QuestionSpec, TextFormat};

/// Question ids the classification engine reads.
pub mod ids {
    pub const HAIR_CONCERN: &str = "hair-concern";
    pub const WASH_FREQUENCY: &str = "wash-frequency";
    pub const HAIR_TEXTURE: &str = "hair-texture";
    pub const HAIR_THICKNESS: &str = "hair-thickness";
    pub const HAIR_POROSITY: &str = "hair-porosity";
    pub const SCALP_FEEL: &str = "scalp-feel";
    pub const CHEMICAL_TREATMENTS: &str = "chemical-treatments";
    pub const HEAT_STYLING: &str = "heat-styling";
    pub const LIFESTYLE_FACTORS: &str = "lifestyle-factors";
    pub const EMAIL: &str = "email";
}

pub const BUILTIN_CATALOG_ID: &str = "strandly-hair-quiz";
pub const BUILTIN_CATALOG_VERSION: &str = "1";

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog::from_trusted(builtin_spec()));

pub fn builtin_catalog() -> Catalog {
    BUILTIN.clone()
}

pub fn builtin_spec() -> CatalogSpec {
    CatalogSpec {
        id: BUILTIN_CATALOG_ID.to_string(),
        version: BUILTIN_CATALOG_VERSION.to_string(),
        questions: vec![
            QuestionSpec::single(
                ids::HAIR_CONCERN,
                "What is your main hair concern?",
                &["dryness", "oiliness", "damage", "breakage", "thinning", "styling"],
            ),
            QuestionSpec::single(
                ids::WASH_FREQUENCY,
                "How often do you wash your hair?",
                &["daily", "2-3 times per week", "weekly", "less than weekly"],
            ),
            QuestionSpec::single(
                ids::HAIR_TEXTURE,
                "How would you describe your natural hair texture?",
                &["straight", "wavy", "curly", "coily"],
            ),
            QuestionSpec::single(
                ids::HAIR_THICKNESS,
                "How thick are your individual strands?",
                &["fine", "medium", "thick"],
            ),
            with_description(
                QuestionSpec::single(
                    ids::HAIR_POROSITY,
                    "Drop a clean strand into a glass of water. What happens?",
                    &["floats", "sinks slowly", "sinks quickly", "untested"],
                ),
                "Leave it for two to four minutes before checking.",
            ),
            QuestionSpec::single(
                ids::SCALP_FEEL,
                "How does your scalp feel a day after washing?",
                &["oily", "balanced", "dry", "sensitive"],
            ),
            QuestionSpec::multiple(
                ids::CHEMICAL_TREATMENTS,
                "Which treatments has your hair had in the last year?",
                &["none", "color", "bleach", "chemical"],
            ),
            QuestionSpec::single(
                ids::HEAT_STYLING,
                "How often do you use heat styling tools?",
                &["daily", "weekly", "rarely", "never"],
            ),
            QuestionSpec::multiple(
                ids::LIFESTYLE_FACTORS,
                "Do any of these apply to you?",
                &[
                    "swimming",
                    "stress",
                    "hard water",
                    "diet changes",
                    "hormonal changes",
                    "none",
                ],
            )
            .optional(),
            with_description(
                QuestionSpec::text(
                    ids::EMAIL,
                    "Where should we send your hair profile?",
                    TextFormat::Email,
                ),
                "We only use it to deliver your results.",
            ),
        ],
    }
}

fn with_description(mut question: QuestionSpec, description: &str) -> QuestionSpec {
    question.description = Some(description.to_string());
    question
}
