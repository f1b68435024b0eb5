//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod config_setting;
pub mod generation_record;
pub mod prompt_template;

pub use config_setting::ConfigSettingEntity;
pub use generation_record::GenerationRecordEntity;
pub use prompt_template::PromptTemplateEntity;
