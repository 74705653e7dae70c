use crate::providers::{GeminiProvider, OpenAIProvider, OpenRouterProvider};
use crate::traits::Provider;
use anyhow::{Result, anyhow};

/// Builds a provider from a `provider/model` spec such as
/// `gemini/gemini-2.5-flash-lite`. The matching API key is read from
/// `<PROVIDER>_API_KEY`; a bare model name selects OpenAI.
pub fn create_provider(model_spec: &str) -> Result<Box<dyn Provider>> {
    let (provider_name, model) = split_model_spec(model_spec);

    match provider_name.to_lowercase().as_str() {
        "gemini" => {
            let api_key = resolve_api_key("GEMINI_API_KEY")?;
            Ok(Box::new(GeminiProvider::new(api_key).with_model(model)))
        }
        "openai" => {
            let api_key = resolve_api_key("OPENAI_API_KEY")?;
            Ok(Box::new(OpenAIProvider::new(api_key).with_model(model)))
        }
        "openrouter" => {
            let api_key = resolve_api_key("OPENROUTER_API_KEY")?;
            Ok(Box::new(OpenRouterProvider::new(api_key).with_model(model)))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available: gemini, openai, openrouter",
            provider_name
        )),
    }
}

/// OpenRouter model ids contain slashes themselves, so only the first
/// segment names the provider.
pub fn split_model_spec(spec: &str) -> (&str, &str) {
    match spec.split_once('/') {
        Some((provider, model)) => (provider, model),
        None => ("openai", spec),
    }
}

fn resolve_api_key(var_name: &str) -> Result<String> {
    std::env::var(var_name).map_err(|_| anyhow!("Environment variable {} not set", var_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_prefixed_spec() {
        assert_eq!(
            split_model_spec("gemini/gemini-2.5-flash-lite"),
            ("gemini", "gemini-2.5-flash-lite")
        );
    }

    #[test]
    fn split_keeps_nested_slashes() {
        assert_eq!(
            split_model_spec("openrouter/anthropic/claude-3.5-sonnet"),
            ("openrouter", "anthropic/claude-3.5-sonnet")
        );
    }

    #[test]
    fn bare_model_defaults_to_openai() {
        assert_eq!(split_model_spec("gpt-4o-mini"), ("openai", "gpt-4o-mini"));
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let err = create_provider("acme/foo-1").err().unwrap();
        assert!(err.to_string().contains("Unknown provider: acme"));
    }
}
