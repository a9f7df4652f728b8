//! Session-local payment reminders

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Priority, Reminder};

#[derive(Debug, Clone, Serialize)]
pub struct ReminderList {
    items: Vec<Reminder>,
    #[serde(skip)]
    next_id: u64,
}

impl Default for ReminderList {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ReminderList {
    /// An empty list
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// The two reminders every new session starts with
    pub fn seeded() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self {
            items: vec![
                Reminder {
                    id: "1".into(),
                    title: "Pagar tarjeta de crédito".into(),
                    date: date(2023, 11, 5),
                    completed: false,
                    priority: Priority::High,
                },
                Reminder {
                    id: "2".into(),
                    title: "Revisar suscripción Netflix".into(),
                    date: date(2023, 11, 10),
                    completed: true,
                    priority: Priority::Low,
                },
            ],
            next_id: 3,
        }
    }

    pub fn items(&self) -> &[Reminder] {
        &self.items
    }

    /// Append a reminder dated `today` with medium priority.
    ///
    /// Blank titles are ignored and return `None`.
    pub fn add(&mut self, title: &str, today: NaiveDate) -> Option<&Reminder> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = self.next_id.to_string();
        self.next_id += 1;
        debug!(id = %id, "Adding reminder");
        self.items.push(Reminder {
            id,
            title: title.to_string(),
            date: today,
            completed: false,
            priority: Priority::default(),
        });
        self.items.last()
    }

    /// Flip completion. Returns the updated reminder.
    pub fn toggle(&mut self, id: &str) -> Result<&Reminder> {
        let reminder = self
            .items
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Reminder {}", id)))?;
        reminder.completed = !reminder.completed;
        Ok(reminder)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let pos = self
            .items
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Reminder {}", id)))?;
        self.items.remove(pos);
        Ok(())
    }
}
