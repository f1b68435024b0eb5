//! HTTP route handlers.

pub mod generate;
pub mod health;
pub mod history;
pub mod llm_settings;
pub mod settings;
pub mod templates;
