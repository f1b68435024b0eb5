//! Domain models for the document generator.

pub mod config_setting;
pub mod generation;
pub mod llm_settings;
pub mod prompt_template;
pub mod settings_catalog;

pub use config_setting::ConfigSetting;
pub use generation::{GenerationRecord, NewGenerationRecord};
pub use llm_settings::{LlmSettings, ProviderKind};
pub use prompt_template::PromptTemplate;
pub use settings_catalog::ReconciliationPolicy;
