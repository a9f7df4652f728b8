//! Mock backend for testing
//!
//! Provides predictable responses for all AI operations.
//! Useful for unit tests and development without an API key.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{ChatMessage, ImagePayload, ReceiptRecord};

use super::AIBackend;

/// Mock AI backend for testing
///
/// Returns one canned record per image, fixed insights, and an echo reply.
/// Can be switched to fail every call.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether every operation should return an error
    pub failing: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
        }
    }

    /// Create a mock backend whose calls all fail
    pub fn failing() -> Self {
        Self {
            healthy: false,
            failing: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(Error::InvalidData("Mock backend configured to fail".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn extract_receipts(&self, files: &[ImagePayload]) -> Result<Vec<ReceiptRecord>> {
        self.check()?;
        Ok(files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                ReceiptRecord::new(
                    format!("Mock Store {}", i + 1),
                    "2024-01-15",
                    10.80,
                    "Varios",
                )
                .with_description(format!("Mock receipt ({})", file.mime_type))
            })
            .collect())
    }

    async fn generate_insights(&self, records: &[ReceiptRecord]) -> Result<String> {
        self.check()?;
        if records.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "- Tienes {} boletas registradas.\n- Revisa tus gastos más altos.\n- Define un presupuesto semanal.",
            records.len()
        ))
    }

    async fn chat(
        &self,
        message: &str,
        _records: &[ReceiptRecord],
        history: &[ChatMessage],
    ) -> Result<String> {
        self.check()?;
        Ok(format!(
            "Mock reply to: {} (history: {})",
            message,
            history.len()
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_mock() {
        let backend = MockBackend::failing();
        assert!(!backend.health_check().await);
        assert!(backend.extract_receipts(&[]).await.is_err());
        assert!(backend.generate_insights(&[]).await.is_err());
        assert!(backend.chat("hola", &[], &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_insights_empty_without_records() {
        let backend = MockBackend::new();
        assert!(backend.generate_insights(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_echo_counts_history() {
        let backend = MockBackend::new();
        let history = vec![ChatMessage::user("a"), ChatMessage::model("b")];
        let reply = backend.chat("hola", &[], &history).await.unwrap();
        assert_eq!(reply, "Mock reply to: hola (history: 2)");
    }
}
