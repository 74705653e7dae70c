use crate::traits::Tool;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::json;

const FIRST_NAMES: &[&str] = &[
    "Alex", "Avery", "Casey", "Dana", "Devon", "Elliot", "Emerson", "Harper", "Hayden", "Jamie",
    "Jordan", "Kendall", "Logan", "Morgan", "Parker", "Quinn", "Reese", "Riley", "Rowan", "Sage",
    "Skyler", "Taylor",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Bailey", "Brooks", "Carter", "Chen", "Diaz", "Ellis", "Garcia", "Hayes", "Kim",
    "Lee", "Mendez", "Nguyen", "Okafor", "Patel", "Reyes", "Rossi", "Silva", "Singh", "Tanaka",
    "Walsh", "Weber",
];

/// The one reference tool: returns a freshly generated human-readable full
/// name. Takes no arguments and never fails.
pub struct RandomNameTool;

impl Default for RandomNameTool {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomNameTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for RandomNameTool {
    fn name(&self) -> &str {
        "make_random_name"
    }

    fn description(&self) -> &str {
        "Generate a random name"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    async fn call(&self, _args: serde_json::Value) -> anyhow::Result<String> {
        let mut rng = rand::thread_rng();
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Jordan");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Lee");
        Ok(format!("{} {}", first, last))
    }
}
