//! Repository implementations for database operations.

pub mod config_setting;
pub mod generation_record;
pub mod prompt_template;

pub use config_setting::{ConfigSettingRepository, SeedReport};
pub use generation_record::GenerationRecordRepository;
pub use prompt_template::PromptTemplateRepository;
