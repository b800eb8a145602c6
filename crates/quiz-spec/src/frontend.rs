use serde_json::Value;

use crate::{HairProfile, RenderPayload, render_json_ui, render_profile_text, render_text};

/// Turns quiz payloads and hair profiles into something a host can display.
pub trait QuizFrontend {
    fn render_text_ui(&self, payload: &RenderPayload) -> String;
    fn render_json_ui(&self, payload: &RenderPayload) -> Value;
    fn render_profile(&self, profile: &HairProfile) -> String;
}

/// Plain-text and JSON output from the `render` module.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultQuizFrontend;

impl QuizFrontend for DefaultQuizFrontend {
    fn render_text_ui(&self, payload: &RenderPayload) -> String {
        render_text(payload)
    }

    fn render_json_ui(&self, payload: &RenderPayload) -> Value {
        render_json_ui(payload)
    }

    fn render_profile(&self, profile: &HairProfile) -> String {
        render_profile_text(profile)
    }
}
