//! Prompt texts for the Gemini backend
//!
//! Prompts are written in Spanish to match the app's audience. Placeholders
//! use `{{name}}` and are filled by [`Prompt::render`].

use crate::error::Result;
use crate::models::ReceiptRecord;

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Vision prompt sent after the receipt images
    ExtractReceipts,
    /// Three short insights about the current spending
    SpendingInsights,
    /// System instruction for the chat assistant
    AssistantSystem,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractReceipts => "extract_receipts",
            Self::SpendingInsights => "spending_insights",
            Self::AssistantSystem => "assistant_system",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Self::ExtractReceipts => EXTRACT_RECEIPTS,
            Self::SpendingInsights => SPENDING_INSIGHTS,
            Self::AssistantSystem => ASSISTANT_SYSTEM,
        }
    }
}

const EXTRACT_RECEIPTS: &str = "Analiza estas imágenes de boletas/recibos. Extrae la información de cada una en un formato estructurado. Identifica el comercio, la fecha (YYYY-MM-DD), el total y una categoría general (ej: Comida, Transporte, Servicios, Ropa, Varios).";

const SPENDING_INSIGHTS: &str = "Basado en estos datos de gastos:
{{receipts}}

Genera 3 insights o consejos financieros breves y útiles para el usuario.
Usa formato Markdown. Sé amigable y directo.";

const ASSISTANT_SYSTEM: &str = "Eres un asistente financiero personal amigable y experto.
Tienes acceso a los datos de gastos del usuario: {{receipts}}.
Responde preguntas sobre sus gastos, da consejos y ayuda con recordatorios.
Sé conciso y útil.";

/// A prompt template ready to be filled in
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    pub id: PromptId,
}

impl Prompt {
    pub fn new(id: PromptId) -> Self {
        Self { id }
    }

    pub fn text(&self) -> &'static str {
        self.id.template()
    }

    /// Replace each `{{key}}` with its value
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = self.text().to_string();
        for (key, value) in vars {
            out = out.replace(&format!("{{{{{}}}}}", key), value);
        }
        out
    }
}

/// Insights prompt with the record snapshot embedded as JSON
pub fn spending_insights(records: &[ReceiptRecord]) -> Result<String> {
    let receipts = serde_json::to_string(records)?;
    Ok(Prompt::new(PromptId::SpendingInsights).render(&[("receipts", &receipts)]))
}

/// Chat system instruction with the record snapshot embedded as JSON
pub fn assistant_system(records: &[ReceiptRecord]) -> Result<String> {
    let receipts = serde_json::to_string(records)?;
    Ok(Prompt::new(PromptId::AssistantSystem).render(&[("receipts", &receipts)]))
}

pub fn extract_receipts() -> &'static str {
    Prompt::new(PromptId::ExtractReceipts).text()
}
