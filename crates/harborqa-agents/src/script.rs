//! Automation-script generation: raw text passthrough with script fallback.

use crate::model::TextModel;
use crate::sanitize::strip_code_fences;
use harborqa_core::{FallbackCatalog, Provenance};
use std::sync::Arc;

/// One generated script plus its provenance.
#[derive(Debug, Clone)]
pub struct ScriptResult {
    pub script: String,
    pub provenance: Provenance,
}

/// Generates an automation script from a selected test case and raw page
/// markup. Unlike the test-case path, no validation is performed: any text
/// the model returns is sanitized and passed through verbatim.
pub struct ScriptAgent {
    model: Arc<dyn TextModel>,
    fallback: Arc<FallbackCatalog>,
}

impl ScriptAgent {
    pub fn new(model: Arc<dyn TextModel>, fallback: Arc<FallbackCatalog>) -> Self {
        Self { model, fallback }
    }

    fn build_prompt(test_case: &serde_json::Value, html: &str) -> String {
        format!(
            "Write a Python Selenium script that automates the following test case \
             against the provided page markup. Respond with the script only.\n\n\
             Test case:\n{}\n\nPage markup:\n{}",
            test_case, html
        )
    }

    /// One model attempt; a failure signal serves the catalog script.
    pub async fn generate(&self, test_case: &serde_json::Value, html: &str) -> ScriptResult {
        let prompt = Self::build_prompt(test_case, html);
        match self.model.generate(&prompt).await {
            Some(raw) => ScriptResult {
                script: strip_code_fences(&raw, &["python"]),
                provenance: Provenance::Live,
            },
            None => {
                tracing::warn!(
                    target: "harborqa::agent",
                    "circuit breaker engaged: serving fallback script"
                );
                ScriptResult {
                    script: self.fallback.script.clone(),
                    provenance: Provenance::Fallback,
                }
            }
        }
    }
}
