//! Document generation and history domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

/// A persisted record of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub template_id: Uuid,
    pub input_data: Option<String>,
    pub generated_content: Option<String>,
    pub format: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Fields needed to insert a history record.
#[derive(Debug, Clone)]
pub struct NewGenerationRecord {
    pub template_id: Uuid,
    pub input_data: Option<String>,
    pub generated_content: String,
    pub format: String,
}

/// Request payload for generating a document.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateRequest {
    pub template_id: Uuid,

    /// Template input as JSON object text.
    pub input_data: Option<String>,

    #[validate(custom(function = "shared::validation::validate_document_format"))]
    pub document_format: Option<String>,
}

impl GenerateRequest {
    /// Parses `input_data` into a field map. Absent or blank input is empty.
    pub fn input_fields(&self) -> Result<Map<String, Value>, InputDataError> {
        parse_input_data(self.input_data.as_deref())
    }
}

/// Error raised for unusable generation input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputDataError {
    #[error("Invalid JSON format for input_data: {0}")]
    InvalidJson(String),
    #[error("input_data must be a JSON object")]
    NotAnObject,
}

/// Parses JSON object text into a field map.
pub fn parse_input_data(raw: Option<&str>) -> Result<Map<String, Value>, InputDataError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(Map::new()),
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(InputDataError::NotAnObject),
        Err(e) => Err(InputDataError::InvalidJson(e.to_string())),
    }
}

/// Response payload for a generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub history_id: Option<Uuid>,
    pub generated_content: String,
    pub document_format: String,
}

/// Response payload for a history record.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecordResponse {
    pub id: Uuid,
    pub template_id: Uuid,
    pub input_data: Option<String>,
    pub generated_content: Option<String>,
    pub document_format: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl From<GenerationRecord> for HistoryRecordResponse {
    fn from(r: GenerationRecord) -> Self {
        Self {
            id: r.id,
            template_id: r.template_id,
            input_data: r.input_data,
            generated_content: r.generated_content,
            document_format: r.format,
            generated_at: r.generated_at,
        }
    }
}

/// Response payload for a template test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestTemplateResponse {
    pub template_id: Uuid,
    pub test_output: String,
}

/// Response payload for the provider connection check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConnectionResponse {
    pub status: String,
    pub message: String,
    pub model: String,
    pub sample_reply: String,
}

impl TestConnectionResponse {
    pub fn ok(model: impl Into<String>, sample_reply: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: "LLM connection successful!".to_string(),
            model: model.into(),
            sample_reply: sample_reply.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(input: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            template_id: Uuid::new_v4(),
            input_data: input.map(str::to_string),
            document_format: None,
        }
    }

    #[test]
    fn test_input_fields_object() {
        let fields = request(Some(r#"{"client": "Acme", "amount": 1200}"#))
            .input_fields()
            .unwrap();
        assert_eq!(fields["client"], json!("Acme"));
        assert_eq!(fields["amount"], json!(1200));
    }

    #[test]
    fn test_input_fields_absent_or_blank() {
        assert!(request(None).input_fields().unwrap().is_empty());
        assert!(request(Some("  ")).input_fields().unwrap().is_empty());
    }

    #[test]
    fn test_input_fields_malformed() {
        let err = request(Some("{not json")).input_fields().unwrap_err();
        assert!(matches!(err, InputDataError::InvalidJson(_)));
        assert!(err.to_string().starts_with("Invalid JSON format for input_data"));
    }

    #[test]
    fn test_input_fields_not_object() {
        assert_eq!(
            request(Some("[1, 2]")).input_fields().unwrap_err(),
            InputDataError::NotAnObject
        );
        assert_eq!(
            request(Some("\"text\"")).input_fields().unwrap_err(),
            InputDataError::NotAnObject
        );
    }

    #[test]
    fn test_document_format_validation() {
        let mut req = request(None);
        req.document_format = Some("docx".to_string());
        assert!(req.validate().is_ok());
        req.document_format = Some("../etc".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_history_response_wire_names() {
        let record = GenerationRecord {
            id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            input_data: Some("{}".to_string()),
            generated_content: Some("Body".to_string()),
            format: Some("pdf".to_string()),
            generated_at: Utc::now(),
        };
        let json = serde_json::to_value(HistoryRecordResponse::from(record)).unwrap();
        assert_eq!(json["document_format"], "pdf");
        assert_eq!(json["generated_content"], "Body");
    }

    #[test]
    fn test_connection_response() {
        let response = TestConnectionResponse::ok("gemini-1.5-flash-latest", "Hi there");
        assert_eq!(response.status, "ok");
        assert_eq!(response.message, "LLM connection successful!");
    }
}
