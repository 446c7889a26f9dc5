//! Test-plan generation with the per-call fallback policy.

use crate::model::TextModel;
use crate::sanitize::strip_code_fences;
use harborqa_core::{FallbackCatalog, Provenance, TestCase};
use std::sync::Arc;

/// Result of one generation request: the cases plus their provenance. The
/// payload is either fully parsed live output or the whole fallback list,
/// never a partially-validated hybrid.
#[derive(Debug, Clone)]
pub struct TestPlan {
    pub test_cases: Vec<TestCase>,
    pub provenance: Provenance,
}

/// Generates structured test cases from a natural-language query, falling
/// back to the static catalog when the model fails or returns unusable
/// output.
pub struct TestCaseAgent {
    model: Arc<dyn TextModel>,
    fallback: Arc<FallbackCatalog>,
}

impl TestCaseAgent {
    pub fn new(model: Arc<dyn TextModel>, fallback: Arc<FallbackCatalog>) -> Self {
        Self { model, fallback }
    }

    fn build_prompt(query: &str, context: &[String]) -> String {
        let mut prompt = String::from(
            "Generate software test cases as a JSON array. Each element must have \
             the fields id, title, description, steps (array of strings), and \
             expected_result. Respond with the JSON array only.\n\n",
        );
        if !context.is_empty() {
            prompt.push_str("Relevant requirements excerpts:\n");
            for snippet in context {
                prompt.push_str("- ");
                prompt.push_str(snippet);
                prompt.push('\n');
            }
            prompt.push('\n');
        }
        prompt.push_str("Feature under test: ");
        prompt.push_str(query);
        prompt
    }

    /// One model attempt. A failure signal or output that does not parse as a
    /// test-case array both activate the fallback catalog; the response never
    /// distinguishes the two.
    pub async fn generate(&self, query: &str, context: &[String]) -> TestPlan {
        let prompt = Self::build_prompt(query, context);
        if let Some(raw) = self.model.generate(&prompt).await {
            let cleaned = strip_code_fences(&raw, &["json"]);
            match serde_json::from_str::<Vec<TestCase>>(&cleaned) {
                Ok(test_cases) => {
                    return TestPlan {
                        test_cases,
                        provenance: Provenance::Live,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        target: "harborqa::agent",
                        error = %e,
                        "model output was not a valid test-case array"
                    );
                }
            }
        }
        tracing::warn!(
            target: "harborqa::agent",
            "circuit breaker engaged: serving fallback test cases"
        );
        TestPlan {
            test_cases: self.fallback.test_cases.clone(),
            provenance: Provenance::Fallback,
        }
    }
}
