//! harborqa-agents: the external model gateway and the two generation agents
//! (test plans and automation scripts) with their per-call fallback policy.

mod model;
mod sanitize;
mod script;
mod testcases;

pub use model::{GeminiModel, MockModel, TextModel};
pub use sanitize::strip_code_fences;
pub use script::{ScriptAgent, ScriptResult};
pub use testcases::{TestCaseAgent, TestPlan};
