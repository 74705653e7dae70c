pub mod factory;
pub mod gemini;
pub mod openai;
pub mod openrouter;

pub use factory::{create_provider, split_model_spec};
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use openrouter::OpenRouterProvider;
