//! Document generation: settings lookup, prompt rendering, provider call and
//! history persistence.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::generation::{
    GenerateRequest, GenerateResponse, TestConnectionResponse, TestTemplateResponse,
};
use domain::models::settings_catalog::DEFAULT_SETTINGS;
use domain::models::{LlmSettings, NewGenerationRecord, PromptTemplate};
use domain::services::llm::{
    content_or, CONNECTION_TEST_PROMPT, DEFAULT_RETRY_DELAY, GENERATION_PROMPT_SUFFIX,
    NO_CONTENT, NO_CONTENT_IN_RESPONSE, TEST_PROMPT_SUFFIX,
};
use domain::services::{
    generate_with_retry, render, GenerationParams, LlmError, LlmProvider, ProviderFactory,
    RetryPolicy,
};
use persistence::repositories::{
    ConfigSettingRepository, GenerationRecordRepository, PromptTemplateRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_document_generated, record_llm_request};

/// Orchestrates a single generation request.
pub struct GenerationService {
    settings: ConfigSettingRepository,
    templates: PromptTemplateRepository,
    history: GenerationRecordRepository,
    providers: Arc<dyn ProviderFactory>,
    retry_delay: Duration,
}

impl GenerationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            settings: ConfigSettingRepository::new(state.pool.clone()),
            templates: PromptTemplateRepository::new(state.pool.clone()),
            history: GenerationRecordRepository::new(state.pool.clone()),
            providers: state.llm.clone(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Resolves the LLM settings, falling back to catalogue defaults.
    pub async fn load_settings(&self) -> Result<LlmSettings, ApiError> {
        let keys: Vec<&str> = DEFAULT_SETTINGS.iter().map(|d| d.key).collect();
        let stored = self.settings.get_values(&keys).await?;
        Ok(LlmSettings::from_lookup(|key| stored.get(key).cloned()))
    }

    /// Generates a document and records it in history when enabled.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        let template = self.active_template(request.template_id).await?;
        let settings = self.load_settings().await?;
        let provider = self.provider_for(&settings)?;

        let fields = request.input_fields()?;
        let prompt = format!("{}{}", render(&template.content, &fields)?, GENERATION_PROMPT_SUFFIX);
        let params = GenerationParams::from_settings(&settings, &settings.model, prompt);

        let text = self.call(provider.as_ref(), &params, &settings).await?;
        let generated_content = content_or(text, NO_CONTENT);
        let document_format = request
            .document_format
            .clone()
            .unwrap_or_else(|| settings.default_doc_format.clone());

        let history_id = if settings.enable_history {
            let record = NewGenerationRecord {
                template_id: template.id,
                input_data: request.input_data.clone(),
                generated_content: generated_content.clone(),
                format: document_format.clone(),
            };
            match self.history.create(&record).await {
                Ok(entity) => Some(entity.id),
                Err(e) => {
                    warn!(
                        template_id = %template.id,
                        error = %e,
                        "Failed to save generation history"
                    );
                    None
                }
            }
        } else {
            None
        };

        record_document_generated(&document_format);
        info!(
            template_id = %template.id,
            provider = provider.name(),
            model = %params.model,
            format = %document_format,
            history_id = ?history_id,
            "Document generated"
        );

        Ok(GenerateResponse {
            history_id,
            generated_content,
            document_format,
        })
    }

    /// Renders a template with sample input and calls the test model.
    /// Nothing is written to history.
    pub async fn test_template(
        &self,
        template_id: Uuid,
        input: &Map<String, Value>,
    ) -> Result<TestTemplateResponse, ApiError> {
        let template = self.active_template(template_id).await?;
        let settings = self.load_settings().await?;
        let provider = self.provider_for(&settings)?;

        let prompt = format!("{}{}", render(&template.content, input)?, TEST_PROMPT_SUFFIX);
        let params = GenerationParams::from_settings(&settings, &settings.test_model, prompt);

        let text = self.call(provider.as_ref(), &params, &settings).await?;
        Ok(TestTemplateResponse {
            template_id: template.id,
            test_output: content_or(text, NO_CONTENT),
        })
    }

    /// Sends a fixed prompt to the test model to check credentials.
    pub async fn test_connection(&self) -> Result<TestConnectionResponse, ApiError> {
        let settings = self.load_settings().await?;
        let provider = self.provider_for(&settings)?;
        let params = GenerationParams::from_settings(
            &settings,
            &settings.test_model,
            CONNECTION_TEST_PROMPT.to_string(),
        );

        let text = self.call(provider.as_ref(), &params, &settings).await?;
        info!(provider = provider.name(), model = %params.model, "LLM connection test succeeded");
        Ok(TestConnectionResponse::ok(
            settings.test_model.clone(),
            content_or(text, NO_CONTENT_IN_RESPONSE),
        ))
    }

    /// Builds the configured provider. Unknown providers are rejected before
    /// credentials are checked.
    fn provider_for(&self, settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>, LlmError> {
        let provider = self.providers.build(settings)?;
        if settings.api_key.is_none() {
            return Err(LlmError::MissingCredentials);
        }
        Ok(provider)
    }

    async fn active_template(&self, id: Uuid) -> Result<PromptTemplate, ApiError> {
        self.templates
            .find_active_by_id(id)
            .await?
            .map(PromptTemplate::from)
            .ok_or_else(|| ApiError::NotFound("Active template not found".to_string()))
    }

    async fn call(
        &self,
        provider: &dyn LlmProvider,
        params: &GenerationParams,
        settings: &LlmSettings,
    ) -> Result<String, LlmError> {
        let policy = RetryPolicy::new(settings.retry_count).with_base_delay(self.retry_delay);
        let result = generate_with_retry(provider, params, policy).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        record_llm_request(provider.name(), outcome);
        if let Err(e) = &result {
            warn!(provider = provider.name(), model = %params.model, error = %e, "LLM call failed");
        }
        result
    }
}
