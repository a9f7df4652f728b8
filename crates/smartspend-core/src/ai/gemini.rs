//! Google Gemini backend
//!
//! Talks to the `generateContent` REST endpoint:
//!
//! ```text
//! POST {host}/v1beta/models/{model}:generateContent
//! x-goog-api-key: <GEN_API_KEY>
//! ```
//!
//! Extraction sends the receipt images as inline parts followed by the
//! extraction prompt, and asks for `application/json` constrained by a
//! response schema. Insights and chat are plain text requests.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ChatMessage, ImagePayload, ReceiptRecord};
use crate::prompts;

use super::parsing::parse_receipts_response;
use super::AIBackend;

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "GEN_API_KEY";
pub const DEFAULT_HOST: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A turn (or the system instruction) made of parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "user", "model"
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".into()),
            parts,
        }
    }

    /// Role-less content, used for `systemInstruction`
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

impl From<&ChatMessage> for Content {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: Some(message.role.as_str().to_string()),
            parts: vec![Part::text(message.text.clone())],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(image: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

/// Inline base64 data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

/// generateContent response body (only the fields we read)
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate. Empty when the model said nothing.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Schema for the extraction response: an array of receipt objects
fn receipts_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "merchant": { "type": "STRING" },
                "date": { "type": "STRING", "description": "YYYY-MM-DD" },
                "total": { "type": "NUMBER" },
                "category": { "type": "STRING" },
                "description": { "type": "STRING", "description": "Breve descripción de los items" }
            },
            "required": ["merchant", "date", "total", "category"]
        }
    })
}

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiBackend {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from),
        }
    }

    /// Create from environment (GEN_API_KEY, GEMINI_HOST, GEMINI_MODEL)
    pub fn from_env() -> Self {
        let host = std::env::var("GEMINI_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = std::env::var(API_KEY_VAR).ok();
        Self::new(&host, &model, api_key.as_deref())
    }

    /// Create a new backend with a different model (same host and key)
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "Missing API key. Set {} in the environment.",
                API_KEY_VAR
            ))
        })
    }

    /// Send a generateContent request and return the response text
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let api_key = self.api_key()?;

        debug!(
            model = %self.model,
            contents = request.contents.len(),
            "Sending Gemini generateContent request"
        );

        let response = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await?;
        let text = generated.text();

        debug!(chars = text.len(), "Received Gemini response");

        Ok(text)
    }
}

#[async_trait]
impl AIBackend for GeminiBackend {
    async fn extract_receipts(&self, files: &[ImagePayload]) -> Result<Vec<ReceiptRecord>> {
        let mut parts: Vec<Part> = files.iter().map(Part::image).collect();
        parts.push(Part::text(prompts::extract_receipts()));

        let request = GenerateRequest {
            contents: vec![Content::user(parts)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: receipts_schema(),
            }),
        };

        let text = self.generate(&request).await?;
        parse_receipts_response(&text)
    }

    async fn generate_insights(&self, records: &[ReceiptRecord]) -> Result<String> {
        let prompt = prompts::spending_insights(records)?;
        let request = GenerateRequest {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            system_instruction: None,
            generation_config: None,
        };
        self.generate(&request).await
    }

    async fn chat(
        &self,
        message: &str,
        records: &[ReceiptRecord],
        history: &[ChatMessage],
    ) -> Result<String> {
        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::user(vec![Part::text(message)]));

        let request = GenerateRequest {
            contents,
            system_instruction: Some(Content::system(prompts::assistant_system(records)?)),
            generation_config: None,
        };
        self.generate(&request).await
    }

    /// Health check - key present and model metadata reachable
    async fn health_check(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };
        match self
            .http_client
            .get(format!("{}/v1beta/models/{}", self.base_url, self.model))
            .header("x-goog-api-key", api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::parsing::parse_receipts_response;
    use crate::test_utils::MockGeminiServer;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::image(&ImagePayload::from_bytes(b"img", "image/png")),
                Part::text("hola"),
            ])],
            system_instruction: Some(Content::system("sys")),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: receipts_schema(),
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(value["contents"][0]["parts"][1]["text"], "hola");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn test_history_maps_roles() {
        let content = Content::from(&ChatMessage::model("respuesta"));
        assert_eq!(content.role.as_deref(), Some("model"));
    }

    #[test]
    fn test_response_text_empty_without_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_blank_key_is_missing() {
        let backend = GeminiBackend::new("http://localhost", "m", Some("  "));
        assert!(!backend.has_api_key());
    }

    #[test]
    fn test_with_model_keeps_key() {
        let backend = GeminiBackend::new("http://localhost/", "a", Some("k"));
        let other = backend.with_model("b");
        assert_eq!(other.model(), "b");
        assert_eq!(other.host(), "http://localhost");
        assert!(other.has_api_key());
    }

    #[tokio::test]
    async fn test_extract_against_mock_server() {
        let server = MockGeminiServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", Some("test-key"));

        let files = vec![ImagePayload::from_bytes(b"receipt", "image/jpeg")];
        let records = backend.extract_receipts(&files).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].merchant, "Supermercado Lider");
        assert_eq!(records[1].category, "Transporte");
    }

    #[tokio::test]
    async fn test_chat_against_mock_server() {
        let server = MockGeminiServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", Some("test-key"));

        let reply = backend.chat("¿Cuánto gasté?", &[], &[]).await.unwrap();
        assert!(!reply.is_empty());
        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockGeminiServer::start_failing().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", Some("test-key"));

        let err = backend.generate_insights(&[]).await.unwrap_err();
        assert!(err.to_string().contains("Gemini API error (500"));
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_missing_key_never_hits_network() {
        let backend = GeminiBackend::new("http://127.0.0.1:1", "gemini-test", None);
        let err = backend
            .extract_receipts(&[ImagePayload::from_bytes(b"x", "image/png")])
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("Missing API key"));
    }

    #[test]
    fn test_schema_required_fields_match_record_parsing() {
        let schema = receipts_schema();
        let required: Vec<&str> = schema["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let properties = schema["items"]["properties"].as_object().unwrap();

        let full = json!({
            "merchant": "Lider",
            "date": "2024-01-15",
            "total": 12.5,
            "category": "Comida",
            "description": "pan"
        });
        assert_eq!(parse_receipts_response(&json!([full]).to_string()).unwrap().len(), 1);

        // A field is required by the schema exactly when a record without it is rejected
        for field in properties.keys() {
            let mut record = full.clone();
            record.as_object_mut().unwrap().remove(field);
            let rejected = parse_receipts_response(&json!([record]).to_string()).is_err();
            assert_eq!(
                rejected,
                required.contains(&field.as_str()),
                "field {}",
                field
            );
        }
    }

    #[test]
    fn test_record_without_date_is_rejected() {
        let err = parse_receipts_response(r#"[{"merchant":"A","total":3,"category":"X"}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("date"));
    }
}
