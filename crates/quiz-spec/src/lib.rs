#![allow(missing_docs)]

pub mod answers;
pub mod builtin;
pub mod classify;
pub mod frontend;
pub mod progress;
pub mod render;
pub mod spec;
pub mod validate;

pub use answers::{AnswerStore, AnswerValue, ValidationError, ValidationResult};
pub use builtin::{BUILTIN_CATALOG_ID, BUILTIN_CATALOG_VERSION, builtin_catalog, builtin_spec};
pub use classify::{
    DamageLevel, HairProfile, HairType, Porosity, Product, ProductRecommendations, ScalpType,
    classify,
};
pub use frontend::{DefaultQuizFrontend, QuizFrontend};
pub use progress::{QuizState, Transition};
pub use render::{
    RenderChoice, RenderPayload, RenderQuestion, RenderStatus, build_render_payload,
    render_json_ui, render_profile_text, render_text,
};
pub use spec::{Catalog, CatalogError, CatalogSpec, QuestionKind, QuestionSpec, TextFormat};
pub use validate::{check_answer, validate_answers};

/// JSON schema of the catalog document served by the quiz backend.
pub fn catalog_schema() -> serde_json::Value {
    schemars::schema_for!(CatalogSpec).to_value()
}
