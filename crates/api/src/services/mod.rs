//! Document generation and LLM provider integrations.

pub mod gemini;
pub mod generation;
pub mod openai;
pub mod provider;

pub use generation::GenerationService;
pub use provider::HttpProviderFactory;
