//! Floating assistant: option menu and conversation transcript
//!
//! Gateway calls happen outside this type. A turn is split in two:
//! [`Conversation::begin_turn`] records the user message and hands back the
//! history to send, [`Conversation::complete_turn`] records the reply.
//! Several turns may be in flight; replies are appended as they arrive.

use serde::{Deserialize, Serialize};

use crate::models::{AssistantMode, ChatMessage};

pub const GREETING: &str = "¡Hola! Aquí estoy para ayudarte a aclarar tus finanzas.";

/// Entries of the assistant menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantOption {
    /// Open a free conversation
    Chat,
    /// Ask for an executive summary of the dashboard
    DashboardAnalysis,
    /// Ask for advice on recent habits
    Advice,
    /// Jump to the reminders view
    Reminders,
}

impl AssistantOption {
    pub const ALL: [AssistantOption; 4] = [
        Self::Chat,
        Self::DashboardAnalysis,
        Self::Advice,
        Self::Reminders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::DashboardAnalysis => "dashboard_analysis",
            Self::Advice => "advice",
            Self::Reminders => "reminders",
        }
    }

    /// Canned user message sent when the option is picked
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            Self::DashboardAnalysis => {
                Some("Explícame mi dashboard actual y dame un resumen ejecutivo.")
            }
            Self::Advice => Some(
                "Quiero un dashboard que entienda mis hábitos. ¿Qué opinas de mis gastos recientes?",
            ),
            Self::Chat | Self::Reminders => None,
        }
    }

    /// Text shown while the canned prompt is being answered
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::DashboardAnalysis => Some("Analizando tu dashboard..."),
            Self::Advice => Some("Revisando tus hábitos..."),
            Self::Chat | Self::Reminders => None,
        }
    }
}

impl std::str::FromStr for AssistantOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "dashboard_analysis" => Ok(Self::DashboardAnalysis),
            "advice" => Ok(Self::Advice),
            "reminders" | "recordatorios" => Ok(Self::Reminders),
            _ => Err(format!("Unknown assistant option: {}", s)),
        }
    }
}

/// Handle for an in-flight turn
#[derive(Debug, Clone)]
pub struct TurnTicket {
    /// Transcript generation the turn belongs to
    pub epoch: u64,
    /// Prior turns, excluding the message being sent
    pub history: Vec<ChatMessage>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    mode: AssistantMode,
    messages: Vec<ChatMessage>,
    /// Turns sent and not yet answered
    pending: usize,
    #[serde(skip)]
    epoch: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AssistantMode {
        self.mode
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Open the panel on the menu, or on the chat if a conversation exists
    pub fn open(&mut self) {
        if self.mode == AssistantMode::Idle {
            self.mode = if self.messages.is_empty() {
                AssistantMode::Menu
            } else {
                AssistantMode::Chat
            };
        }
    }

    /// Hide the panel. The transcript is kept.
    pub fn close(&mut self) {
        self.mode = AssistantMode::Idle;
    }

    /// Switch to the chat and greet the user
    pub fn start_chat(&mut self) {
        self.mode = AssistantMode::Chat;
        self.messages.push(ChatMessage::model(GREETING));
    }

    /// Record the user's message. Blank input is ignored.
    pub fn begin_turn(&mut self, text: &str) -> Option<TurnTicket> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(text));
        self.mode = AssistantMode::Chat;
        self.pending += 1;
        Some(TurnTicket {
            epoch: self.epoch,
            history,
            message: text.to_string(),
        })
    }

    /// Record the reply for `ticket`. Returns false when the transcript was
    /// reset after the turn began and the reply was dropped.
    pub fn complete_turn(&mut self, ticket: &TurnTicket, reply: impl Into<String>) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        self.messages.push(ChatMessage::model(reply));
        self.pending = self.pending.saturating_sub(1);
        true
    }

    /// Empty the transcript and go back to the menu
    pub fn reset(&mut self) {
        self.messages.clear();
        self.pending = 0;
        self.epoch += 1;
        self.mode = AssistantMode::Menu;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_round_trip() {
        for option in AssistantOption::ALL {
            assert_eq!(option.as_str().parse::<AssistantOption>().unwrap(), option);
        }
        assert_eq!(
            "recordatorios".parse::<AssistantOption>().unwrap(),
            AssistantOption::Reminders
        );
        assert!("other".parse::<AssistantOption>().is_err());
    }

    #[test]
    fn test_open_and_close() {
        let mut conv = Conversation::new();
        assert_eq!(conv.mode(), AssistantMode::Idle);
        conv.open();
        assert_eq!(conv.mode(), AssistantMode::Menu);
        conv.start_chat();
        conv.close();
        assert_eq!(conv.messages().len(), 1);
        conv.open();
        assert_eq!(conv.mode(), AssistantMode::Chat);
    }

    #[test]
    fn test_blank_message_ignored() {
        let mut conv = Conversation::new();
        assert!(conv.begin_turn("  ").is_none());
        assert!(conv.messages().is_empty());
        assert_eq!(conv.pending(), 0);
    }

    #[test]
    fn test_turn_history_excludes_current_message() {
        let mut conv = Conversation::new();
        conv.start_chat();
        let ticket = conv.begin_turn("¿Cuánto gasté?").unwrap();
        assert_eq!(ticket.history, vec![ChatMessage::model(GREETING)]);
        assert_eq!(conv.pending(), 1);

        assert!(conv.complete_turn(&ticket, "Mucho"));
        assert_eq!(conv.pending(), 0);
        assert_eq!(
            conv.messages().last().unwrap(),
            &ChatMessage::model("Mucho")
        );
    }

    #[test]
    fn test_overlapping_turns_append_in_arrival_order() {
        let mut conv = Conversation::new();
        let first = conv.begin_turn("uno").unwrap();
        let second = conv.begin_turn("dos").unwrap();
        assert_eq!(second.history.len(), 1);

        conv.complete_turn(&second, "respuesta dos");
        conv.complete_turn(&first, "respuesta uno");

        let texts: Vec<_> = conv.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["uno", "dos", "respuesta dos", "respuesta uno"]);
    }

    #[test]
    fn test_reset_drops_late_replies() {
        let mut conv = Conversation::new();
        let ticket = conv.begin_turn("hola").unwrap();
        conv.reset();
        assert_eq!(conv.mode(), AssistantMode::Menu);
        assert!(!conv.complete_turn(&ticket, "tarde"));
        assert!(conv.messages().is_empty());
    }

    #[test]
    fn test_canned_prompts() {
        assert!(AssistantOption::Advice.prompt().unwrap().contains("hábitos"));
        assert_eq!(
            AssistantOption::DashboardAnalysis.placeholder(),
            Some("Analizando tu dashboard...")
        );
        assert!(AssistantOption::Chat.prompt().is_none());
    }
}
