//! Domain services for the document generator.
//!
//! Services contain business logic that operates on domain models.

pub mod llm;
pub mod template;

pub use llm::{
    generate_with_retry, GenerationParams, LlmError, LlmProvider, ProviderFactory, RetryPolicy,
    ScriptedLlmProvider, ScriptedProviderFactory,
};
pub use template::{render, RenderError};
