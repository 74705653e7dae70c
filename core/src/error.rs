use thiserror::Error;

/// Fatal failures of a single agent run.
///
/// Every variant aborts the run; nothing is caught or retried internally.
/// Internal code keeps `anyhow` context chains; callers match on these to
/// report the failure.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model '{model}' does not support tool calling")]
    UnsupportedModel { model: String },

    #[error("requested to call unrecognized tool '{name}'")]
    UnknownTool { name: String },

    #[error("invalid arguments for tool '{tool}': {source}")]
    ArgumentParse {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tool '{name}' failed: {cause}")]
    Tool { name: String, cause: anyhow::Error },

    #[error("provider request failed: {0}")]
    Provider(anyhow::Error),

    #[error("sandbox: {0}")]
    Sandbox(String),
}
