use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Static declaration of a callable capability, exposed to the provider on
/// every completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    /// Invoke the tool with keyword arguments parsed from the model's
    /// tool-call request. Returns the text fed back into the conversation.
    async fn call(&self, args: serde_json::Value) -> anyhow::Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
