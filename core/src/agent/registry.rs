use crate::traits::{Tool, ToolSpec};
use std::sync::{Arc, Mutex};

/// Name → implementation mapping for the tools the model may call.
///
/// The set is built once at startup; the loop stays agnostic to the
/// concrete tools and works purely against this mapping.
pub struct ToolRegistry {
    tools: Mutex<Vec<Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, tool: Box<dyn Tool>) {
        let mut tools = self.tools.lock().unwrap();
        tools.push(Arc::from(tool));
    }

    /// Fresh copy of every spec, collected anew on each call so the view
    /// handed to the provider is never shared across rounds.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let tools = self.tools.lock().unwrap();
        tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.lock().unwrap();
        tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn call(&self, args: serde_json::Value) -> anyhow::Result<String> {
            Ok(args.to_string())
        }
    }

    #[test]
    fn registry_lookup() {
        let registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn specs_are_fresh_copies() {
        let registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let first = registry.specs();
        let second = registry.specs();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, second[0].name);
        assert_eq!(first[0].parameters, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.specs().is_empty());
    }
}
