use crate::agent::ToolRegistry;
use crate::error::AgentError;
use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider};
use std::sync::Arc;
use tracing::debug;

/// Drives the conversation toward a final textual answer, resolving tool
/// calls the model requests while bounding the number of round-trips.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    max_callbacks: usize,
    reflect: bool,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            max_callbacks: 5,
            reflect: false,
        }
    }

    pub fn with_max_callbacks(mut self, max: usize) -> Self {
        self.max_callbacks = max;
        self
    }

    pub fn with_reflect(mut self, reflect: bool) -> Self {
        self.reflect = reflect;
        self
    }

    /// Runs the loop over the seeded history and returns the final
    /// assistant text, which may be absent when the run ends on an
    /// unresolved tool-call response.
    pub async fn run(&self, mut messages: Vec<ChatMessage>) -> Result<Option<String>, AgentError> {
        if !self.provider.supports_tool_calls() {
            return Err(AgentError::UnsupportedModel {
                model: self.provider.model().to_string(),
            });
        }

        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            "starting agent loop"
        );

        let mut response = self.complete(&messages).await?;
        let mut callbacks = 0usize;

        // The continuation condition is `callbacks <= max_callbacks`, so up
        // to max_callbacks + 1 tool-resolving round-trips can happen. The
        // off-by-one is observable behavior and is kept as-is.
        while response.has_tool_calls() && callbacks <= self.max_callbacks {
            debug!(
                callbacks,
                requested = response.tool_calls.len(),
                "resolving tool calls"
            );

            messages.push(ChatMessage::assistant_with_tool_calls(
                response.text_or_empty().to_string(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let tool =
                    self.registry
                        .get(&call.name)
                        .ok_or_else(|| AgentError::UnknownTool {
                            name: call.name.clone(),
                        })?;

                let args: serde_json::Value = serde_json::from_str(&call.arguments)
                    .map_err(|source| AgentError::ArgumentParse {
                        tool: call.name.clone(),
                        source,
                    })?;

                debug!(tool = %call.name, id = %call.id, "invoking tool");
                let output = tool.call(args).await.map_err(|cause| AgentError::Tool {
                    name: call.name.clone(),
                    cause,
                })?;

                messages.push(ChatMessage::tool_result(
                    call.id.clone(),
                    call.name.clone(),
                    output,
                ));
            }

            response = self.complete(&messages).await?;
            callbacks += 1;
        }

        if self.reflect {
            let prior = response.text.clone().unwrap_or_default();
            messages.push(ChatMessage::user(format!(
                "Please reflect on your last output, which was '{prior}'. \
                 If you can improve it, please do so and provide a new response."
            )));
            // Exactly one extra completion; tool calls in the reflected
            // response are not resolved.
            response = self.complete(&messages).await?;
        }

        Ok(response.text)
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatResponse, AgentError> {
        // Specs are collected fresh for every call so no round ever hands
        // the provider a view shared with a previous one.
        let tools = self.registry.specs();
        let request = ChatRequest {
            messages,
            tools: if tools.is_empty() { None } else { Some(&tools) },
        };

        self.provider
            .chat(request)
            .await
            .map_err(AgentError::Provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Tool, ToolCall};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        responses: Mutex<VecDeque<ChatResponse>>,
        calls: AtomicUsize,
        supports: bool,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubProvider {
        fn new(responses: Vec<ChatResponse>, supports: bool) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                supports,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> Vec<ChatMessage> {
            self.seen.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        fn supports_tool_calls(&self) -> bool {
            self.supports
        }

        async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow!("stub script exhausted"))
        }
    }

    struct NameTool;

    #[async_trait]
    impl Tool for NameTool {
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
            Ok("Jordan Lee".to_string())
        }
    }

    fn text(content: &str) -> ChatResponse {
        ChatResponse {
            text: Some(content.to_string()),
            tool_calls: vec![],
        }
    }

    fn tool_call(name: &str, arguments: &str) -> ChatResponse {
        ChatResponse {
            text: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        }
    }

    fn registry_with_name_tool() -> Arc<ToolRegistry> {
        let registry = ToolRegistry::new();
        registry.register(Box::new(NameTool));
        Arc::new(registry)
    }

    fn seed() -> Vec<ChatMessage> {
        vec![ChatMessage::user("What is your name?")]
    }

    #[tokio::test]
    async fn unsupported_model_fails_before_any_call() {
        let provider = Arc::new(StubProvider::new(vec![text("never sent")], false));
        let agent = AgentLoop::new(provider.clone(), registry_with_name_tool());

        let err = agent.run(seed()).await.unwrap_err();
        assert!(matches!(err, AgentError::UnsupportedModel { .. }));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn plain_text_passes_through() {
        let provider = Arc::new(StubProvider::new(vec![text("hello")], true));
        let agent = AgentLoop::new(provider.clone(), registry_with_name_tool());

        let answer = agent.run(seed()).await.unwrap();
        assert_eq!(answer.as_deref(), Some("hello"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn tool_round_then_answer() {
        let provider = Arc::new(StubProvider::new(
            vec![
                tool_call("make_random_name", "{}"),
                text("My name is Jordan Lee."),
            ],
            true,
        ));
        let agent = AgentLoop::new(provider.clone(), registry_with_name_tool());

        let answer = agent.run(seed()).await.unwrap();
        assert_eq!(answer.as_deref(), Some("My name is Jordan Lee."));
        assert_eq!(provider.call_count(), 2);

        // The second request must replay the assistant tool-call turn and
        // the correlated tool result.
        let history = provider.last_request();
        let tool_msg = history.iter().find(|m| m.role == "tool").unwrap();
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_msg.name.as_deref(), Some("make_random_name"));
        assert_eq!(tool_msg.content, "Jordan Lee");
        assert!(
            history
                .iter()
                .any(|m| m.role == "assistant" && m.tool_calls.is_some())
        );
    }

    #[tokio::test]
    async fn unknown_tool_stops_the_loop() {
        let provider = Arc::new(StubProvider::new(
            vec![tool_call("launch_rockets", "{}"), text("unreachable")],
            true,
        ));
        let agent = AgentLoop::new(provider.clone(), registry_with_name_tool());

        let err = agent.run(seed()).await.unwrap_err();
        match err {
            AgentError::UnknownTool { name } => assert_eq!(name, "launch_rockets"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn malformed_arguments_fail() {
        let provider = Arc::new(StubProvider::new(
            vec![tool_call("make_random_name", "not json")],
            true,
        ));
        let agent = AgentLoop::new(provider.clone(), registry_with_name_tool());

        let err = agent.run(seed()).await.unwrap_err();
        assert!(matches!(err, AgentError::ArgumentParse { .. }));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn zero_cap_still_permits_one_round() {
        let provider = Arc::new(StubProvider::new(
            vec![
                tool_call("make_random_name", "{}"),
                tool_call("make_random_name", "{}"),
                text("unreachable"),
            ],
            true,
        ));
        let agent =
            AgentLoop::new(provider.clone(), registry_with_name_tool()).with_max_callbacks(0);

        // One resolving round runs at callbacks == 0; the second tool-call
        // response exceeds the cap and is returned unresolved.
        let answer = agent.run(seed()).await.unwrap();
        assert_eq!(answer, None);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn cap_is_inclusive() {
        let provider = Arc::new(StubProvider::new(
            vec![
                tool_call("make_random_name", "{}"),
                tool_call("make_random_name", "{}"),
                tool_call("make_random_name", "{}"),
            ],
            true,
        ));
        let agent =
            AgentLoop::new(provider.clone(), registry_with_name_tool()).with_max_callbacks(1);

        // max_callbacks = 1 permits two resolving rounds (0 and 1), so
        // three completion calls in total.
        let answer = agent.run(seed()).await.unwrap();
        assert_eq!(answer, None);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn reflect_quotes_prior_answer() {
        let provider = Arc::new(StubProvider::new(
            vec![text("first draft"), text("improved")],
            true,
        ));
        let agent =
            AgentLoop::new(provider.clone(), registry_with_name_tool()).with_reflect(true);

        let answer = agent.run(seed()).await.unwrap();
        assert_eq!(answer.as_deref(), Some("improved"));
        assert_eq!(provider.call_count(), 2);

        let history = provider.last_request();
        let last = history.last().unwrap();
        assert_eq!(last.role, "user");
        assert!(last.content.contains("'first draft'"));
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let provider = Arc::new(StubProvider::new(vec![], true));
        let agent = AgentLoop::new(provider.clone(), registry_with_name_tool());

        let err = agent.run(seed()).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
    }
}
