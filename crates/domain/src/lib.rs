//! Domain layer for the document generator backend.
//!
//! This crate contains:
//! - Domain models (ConfigSetting, PromptTemplate, GenerationRecord)
//! - The built-in settings catalogue
//! - Template rendering and the LLM provider abstraction

pub mod models;
pub mod services;
