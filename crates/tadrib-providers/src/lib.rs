//! tadrib-providers: Generative-AI assistant integrations.
//!
//! Implements the `AiAssistant` trait for Gemini and a canned mock, and
//! loads the application configuration that selects between them.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{create_assistant, load_config, load_config_from, AssistantKind, TadribConfig};
pub use error::ProviderError;
pub use gemini::{GeminiAssistant, GeminiModels};
pub use mock::MockAssistant;
