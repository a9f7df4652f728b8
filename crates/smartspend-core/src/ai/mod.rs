//! Pluggable AI backend abstraction
//!
//! Receipt extraction and the advisory texts (insights, chat) are delegated to
//! a hosted generative model. This module hides which one behind a single
//! trait so the session logic and the HTTP layer never talk to a vendor API
//! directly.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEN_API_KEY`: Gemini API key. Only checked when a request is made
//! - `GEMINI_HOST`: API base URL (default: https://generativelanguage.googleapis.com)
//! - `GEMINI_MODEL`: Model name (default: gemini-2.5-flash)

mod gemini;
mod mock;
pub mod parsing;

pub use gemini::{GeminiBackend, API_KEY_VAR, DEFAULT_HOST, DEFAULT_MODEL};
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatMessage, ImagePayload, ReceiptRecord};

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Extract one record per receipt found in the images.
    ///
    /// An empty model response yields an empty batch.
    async fn extract_receipts(&self, files: &[ImagePayload]) -> Result<Vec<ReceiptRecord>>;

    /// Short Markdown insights about the given records. May be empty.
    async fn generate_insights(&self, records: &[ReceiptRecord]) -> Result<String>;

    /// Answer `message` given the records as context and the prior turns. May be empty.
    async fn chat(
        &self,
        message: &str,
        records: &[ReceiptRecord],
        history: &[ChatMessage],
    ) -> Result<String>;

    /// Check if the backend is reachable and configured
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Google Gemini (generateContent API)
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `gemini` (default): Uses GEN_API_KEY, GEMINI_HOST and GEMINI_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// A missing API key is not an error here; it surfaces on the first call.
    pub fn from_env() -> Self {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" | "google" => AIClient::Gemini(GeminiBackend::from_env()),
            "mock" => AIClient::Mock(MockBackend::new()),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to gemini");
                AIClient::Gemini(GeminiBackend::from_env())
            }
        }
    }

    /// Create a Gemini backend directly
    pub fn gemini(host: &str, model: &str, api_key: Option<&str>) -> Self {
        AIClient::Gemini(GeminiBackend::new(host, model, api_key))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn extract_receipts(&self, files: &[ImagePayload]) -> Result<Vec<ReceiptRecord>> {
        match self {
            AIClient::Gemini(b) => b.extract_receipts(files).await,
            AIClient::Mock(b) => b.extract_receipts(files).await,
        }
    }

    async fn generate_insights(&self, records: &[ReceiptRecord]) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.generate_insights(records).await,
            AIClient::Mock(b) => b.generate_insights(records).await,
        }
    }

    async fn chat(
        &self,
        message: &str,
        records: &[ReceiptRecord],
        history: &[ChatMessage],
    ) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.chat(message, records, history).await,
            AIClient::Mock(b) => b.chat(message, records, history).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AIClient::mock();
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_extract_one_record_per_image() {
        let client = AIClient::mock();
        let files = vec![
            ImagePayload::from_bytes(b"one", "image/jpeg"),
            ImagePayload::from_bytes(b"two", "image/png"),
        ];
        let records = client.extract_receipts(&files).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.validate().is_ok()));
    }

    #[tokio::test]
    async fn test_gemini_without_key_fails_with_config_error() {
        let client = AIClient::gemini("http://localhost:1", "test-model", None);
        let err = client.generate_insights(&[]).await.unwrap_err();
        assert!(err.is_config());
    }
}
