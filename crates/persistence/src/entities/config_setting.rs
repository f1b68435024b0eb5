//! Configuration setting entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::ConfigSetting;

/// Database row mapping for the application_config table.
#[derive(Debug, Clone, FromRow)]
pub struct ConfigSettingEntity {
    pub id: i32,
    pub config_key: String,
    pub config_value: String,
    pub description: Option<String>,
    pub is_secret: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConfigSettingEntity> for ConfigSetting {
    fn from(entity: ConfigSettingEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.config_key,
            value: entity.config_value,
            description: entity.description,
            is_secret: entity.is_secret,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
