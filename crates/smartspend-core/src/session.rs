//! Session controller
//!
//! `Session` owns all per-user state: the current view, the record store, the
//! chart selection, the pending upload, the assistant transcript, reminders and
//! the cached insights text. Every change goes through a method here.
//!
//! Gateway calls are not made by the session. Long-running work is split into
//! a `begin_*` step that snapshots what the call needs and a `finish_*` /
//! `complete_*` step that applies the result, so a caller can release its lock
//! while the gateway is busy.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, SpendingSummary};
use crate::assistant::{AssistantOption, Conversation, TurnTicket};
use crate::charts::{ChartDataset, ChartInfo, ChartSelection, CATALOG};
use crate::error::{Error, Result};
use crate::gateway::{EMPTY_SELECTION_MESSAGE, EXTRACTION_RETRY_MESSAGE};
use crate::models::{ChartType, ImagePayload, ReceiptRecord, Reminder, ViewState};
use crate::reminders::ReminderList;
use crate::store::RecordStore;

/// Images chosen for the next submission plus the outcome of the last one
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadState {
    files: Vec<ImagePayload>,
    in_flight: bool,
    error: Option<String>,
}

impl UploadState {
    pub fn files(&self) -> &[ImagePayload] {
        &self.files
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Insights text tied to the store revision it was computed for
#[derive(Debug, Clone, Default)]
struct InsightsCache {
    revision: Option<u64>,
    text: Option<String>,
    loading: bool,
}

/// Snapshot handed out by [`Session::insights_request`]
#[derive(Debug, Clone)]
pub struct InsightsRequest {
    pub revision: u64,
    pub records: Vec<ReceiptRecord>,
}

/// What the UI should do after an assistant option is picked
#[derive(Debug, Clone)]
pub enum OptionOutcome {
    /// Chat opened with a greeting
    Greeting,
    /// A canned prompt was recorded; send it to the gateway
    Turn {
        ticket: TurnTicket,
        placeholder: &'static str,
    },
    /// View switched to reminders and the panel closed
    ShowReminders,
}

/// Everything the dashboard view renders
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub summary: SpendingSummary,
    pub charts: Vec<ChartDataset>,
    pub selection: Vec<ChartType>,
    pub catalog: Vec<ChartInfo>,
}

/// Lightweight overview of the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    pub view: ViewState,
    pub record_count: usize,
    pub pending_files: usize,
    pub upload_in_flight: bool,
    pub upload_error: Option<String>,
    pub assistant: crate::models::AssistantMode,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    view: ViewState,
    store: RecordStore,
    charts: ChartSelection,
    upload: UploadState,
    conversation: Conversation,
    reminders: ReminderList,
    insights: InsightsCache,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Switch views. The dashboard needs records; without them the upload
    /// view is shown instead.
    pub fn set_view(&mut self, view: ViewState) -> ViewState {
        self.view = match view {
            ViewState::Dashboard if self.store.is_empty() => ViewState::Upload,
            other => other,
        };
        self.view
    }

    pub fn overview(&self) -> SessionOverview {
        SessionOverview {
            view: self.view,
            record_count: self.store.len(),
            pending_files: self.upload.files.len(),
            upload_in_flight: self.upload.in_flight,
            upload_error: self.upload.error.clone(),
            assistant: self.conversation.mode(),
        }
    }

    // --- records ---

    pub fn records(&self) -> &[ReceiptRecord] {
        self.store.snapshot()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Append already-extracted records (e.g. loaded from a file) and show the dashboard
    pub fn load_records(&mut self, batch: Vec<ReceiptRecord>) -> Result<usize> {
        for (i, record) in batch.iter().enumerate() {
            record
                .validate()
                .map_err(|e| Error::Validation(format!("Record {}: {}", i + 1, e)))?;
        }
        let added = batch.len();
        self.store.append(batch);
        if !self.store.is_empty() {
            self.view = ViewState::Dashboard;
        }
        Ok(added)
    }

    /// Discard every record and go back to the upload view.
    ///
    /// Destructive; callers confirm with the user first.
    pub fn clear_records(&mut self) {
        self.store.clear();
        self.view = ViewState::Upload;
    }

    // --- upload ---

    pub fn upload(&self) -> &UploadState {
        &self.upload
    }

    fn ensure_upload_idle(&self) -> Result<()> {
        if self.upload.in_flight {
            return Err(Error::Validation("An upload is already in progress".into()));
        }
        Ok(())
    }

    pub fn add_files(&mut self, files: Vec<ImagePayload>) -> Result<usize> {
        self.ensure_upload_idle()?;
        self.upload.files.extend(files);
        self.upload.error = None;
        Ok(self.upload.files.len())
    }

    pub fn remove_file(&mut self, index: usize) -> Result<ImagePayload> {
        self.ensure_upload_idle()?;
        if index >= self.upload.files.len() {
            return Err(Error::NotFound(format!("Upload file {}", index)));
        }
        Ok(self.upload.files.remove(index))
    }

    pub fn clear_files(&mut self) -> Result<()> {
        self.ensure_upload_idle()?;
        self.upload.files.clear();
        self.upload.error = None;
        Ok(())
    }

    /// Snapshot the selection for extraction. An empty selection is refused
    /// and only the prompt message is recorded.
    pub fn begin_upload(&mut self) -> Result<Vec<ImagePayload>> {
        self.ensure_upload_idle()?;
        if self.upload.files.is_empty() {
            self.upload.error = Some(EMPTY_SELECTION_MESSAGE.to_string());
            return Err(Error::Validation(EMPTY_SELECTION_MESSAGE.into()));
        }
        self.upload.in_flight = true;
        self.upload.error = None;
        debug!(files = self.upload.files.len(), "Upload started");
        Ok(self.upload.files.clone())
    }

    /// Apply the extraction result.
    ///
    /// On success the batch is appended as a whole, the selection is cleared
    /// and the dashboard is shown. On failure store and selection are left
    /// as they were and the error is returned.
    pub fn finish_upload(&mut self, result: Result<Vec<ReceiptRecord>>) -> Result<usize> {
        self.upload.in_flight = false;
        match result {
            Ok(batch) => {
                let added = batch.len();
                self.store.append(batch);
                self.upload.files.clear();
                self.upload.error = None;
                self.view = ViewState::Dashboard;
                info!(added, total = self.store.len(), "Upload finished");
                Ok(added)
            }
            Err(e) => {
                self.upload.error = Some(if e.is_config() {
                    e.to_string()
                } else {
                    EXTRACTION_RETRY_MESSAGE.to_string()
                });
                Err(e)
            }
        }
    }

    /// Release an upload whose result will never arrive. The selection is
    /// kept so the user can submit it again.
    pub fn abandon_upload(&mut self) {
        if self.upload.in_flight {
            self.upload.in_flight = false;
            warn!(files = self.upload.files.len(), "Upload abandoned before finishing");
        }
    }

    // --- dashboard ---

    pub fn charts(&self) -> &ChartSelection {
        &self.charts
    }

    pub fn toggle_chart(&mut self, id: ChartType) -> bool {
        self.charts.toggle(id)
    }

    /// Summary and the selected datasets, recomputed from the current records
    pub fn dashboard(&self) -> DashboardView {
        let aggregation = aggregate(self.store.snapshot());
        DashboardView {
            charts: self.charts.visible_datasets(&aggregation),
            summary: aggregation.summary,
            selection: self.charts.active().to_vec(),
            catalog: CATALOG.to_vec(),
        }
    }

    // --- insights ---

    /// Insights computed for the current records, if any
    pub fn cached_insights(&self) -> Option<&str> {
        if self.insights.revision == Some(self.store.revision()) {
            self.insights.text.as_deref()
        } else {
            None
        }
    }

    pub fn insights_loading(&self) -> bool {
        self.insights.loading
    }

    /// Records to summarize when the cached insights are stale.
    ///
    /// Returns `None` when the cache is fresh or there is nothing to summarize.
    pub fn insights_request(&mut self) -> Option<InsightsRequest> {
        if self.store.is_empty() || self.cached_insights().is_some() {
            return None;
        }
        self.insights.loading = true;
        Some(InsightsRequest {
            revision: self.store.revision(),
            records: self.store.snapshot().to_vec(),
        })
    }

    /// Store insights computed for `revision`. Results for an older revision are dropped.
    pub fn store_insights(&mut self, revision: u64, text: String) -> bool {
        self.insights.loading = false;
        if revision != self.store.revision() {
            debug!(revision, current = self.store.revision(), "Dropping stale insights");
            return false;
        }
        self.insights.revision = Some(revision);
        self.insights.text = Some(text);
        true
    }

    /// Clear the loading flag after a summary call that produced nothing to store
    pub fn insights_failed(&mut self) {
        self.insights.loading = false;
    }

    // --- assistant ---

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn open_assistant(&mut self) {
        self.conversation.open();
    }

    pub fn close_assistant(&mut self) {
        self.conversation.close();
    }

    pub fn select_option(&mut self, option: AssistantOption) -> OptionOutcome {
        match option {
            AssistantOption::Chat => {
                self.conversation.start_chat();
                OptionOutcome::Greeting
            }
            AssistantOption::Reminders => {
                self.view = ViewState::Reminders;
                self.conversation.close();
                OptionOutcome::ShowReminders
            }
            AssistantOption::DashboardAnalysis | AssistantOption::Advice => {
                let prompt = option.prompt().unwrap_or_default();
                let placeholder = option.placeholder().unwrap_or_default();
                match self.conversation.begin_turn(prompt) {
                    Some(ticket) => OptionOutcome::Turn {
                        ticket,
                        placeholder,
                    },
                    None => OptionOutcome::Greeting,
                }
            }
        }
    }

    /// Record a free-text message. Blank input is ignored.
    pub fn begin_turn(&mut self, text: &str) -> Option<TurnTicket> {
        self.conversation.begin_turn(text)
    }

    pub fn complete_turn(&mut self, ticket: &TurnTicket, reply: impl Into<String>) -> bool {
        self.conversation.complete_turn(ticket, reply)
    }

    pub fn reset_assistant(&mut self) {
        self.conversation.reset();
    }

    // --- reminders ---

    pub fn reminders(&self) -> &[Reminder] {
        self.reminders.items()
    }

    pub fn add_reminder(&mut self, title: &str, today: NaiveDate) -> Option<Reminder> {
        self.reminders.add(title, today).cloned()
    }

    pub fn toggle_reminder(&mut self, id: &str) -> Result<Reminder> {
        self.reminders.toggle(id).cloned()
    }

    pub fn delete_reminder(&mut self, id: &str) -> Result<()> {
        self.reminders.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssistantMode;

    fn image() -> ImagePayload {
        ImagePayload::from_bytes(b"receipt", "image/jpeg")
    }

    fn batch() -> Vec<ReceiptRecord> {
        vec![
            ReceiptRecord::new("A", "2024-01-02", 10.0, "Food"),
            ReceiptRecord::new("B", "2024-01-01", 5.0, "Food"),
        ]
    }

    #[test]
    fn test_new_session_starts_on_upload() {
        let session = Session::new();
        assert_eq!(session.view(), ViewState::Upload);
        assert!(session.records().is_empty());
        assert_eq!(session.reminders().len(), 2);
        assert_eq!(
            session.charts().active(),
            &[ChartType::CategoryPie, ChartType::MerchantBar]
        );
    }

    #[test]
    fn test_empty_selection_blocks_submission() {
        let mut session = Session::new();
        let err = session.begin_upload().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(session.upload().error(), Some(EMPTY_SELECTION_MESSAGE));
        assert!(!session.upload().in_flight());
    }

    #[test]
    fn test_successful_upload_appends_and_shows_dashboard() {
        let mut session = Session::new();
        session.add_files(vec![image(), image()]).unwrap();
        let files = session.begin_upload().unwrap();
        assert_eq!(files.len(), 2);
        assert!(session.upload().in_flight());

        let added = session.finish_upload(Ok(batch())).unwrap();
        assert_eq!(added, 2);
        assert_eq!(session.records().len(), 2);
        assert!(session.upload().files().is_empty());
        assert_eq!(session.view(), ViewState::Dashboard);
    }

    #[test]
    fn test_failed_upload_leaves_store_and_selection_unchanged() {
        let mut session = Session::new();
        session.load_records(batch()).unwrap();
        session.set_view(ViewState::Upload);
        session.add_files(vec![image()]).unwrap();
        let before = session.records().to_vec();

        session.begin_upload().unwrap();
        let err = session
            .finish_upload(Err(Error::Extraction(EXTRACTION_RETRY_MESSAGE.into())))
            .unwrap_err();

        assert!(matches!(err, Error::Extraction(_)));
        assert_eq!(session.records(), before.as_slice());
        assert_eq!(session.upload().files().len(), 1);
        assert_eq!(session.upload().error(), Some(EXTRACTION_RETRY_MESSAGE));
        assert_eq!(session.view(), ViewState::Upload);
    }

    #[test]
    fn test_selection_locked_while_uploading() {
        let mut session = Session::new();
        session.add_files(vec![image()]).unwrap();
        session.begin_upload().unwrap();
        assert!(session.add_files(vec![image()]).is_err());
        assert!(session.remove_file(0).is_err());
        assert!(session.begin_upload().is_err());
    }

    #[test]
    fn test_abandoned_upload_keeps_selection() {
        let mut session = Session::new();
        session.add_files(vec![image()]).unwrap();
        session.begin_upload().unwrap();

        session.abandon_upload();

        assert!(!session.upload().in_flight());
        assert_eq!(session.upload().files().len(), 1);
        assert!(session.records().is_empty());
        session.add_files(vec![image()]).unwrap();
        assert_eq!(session.begin_upload().unwrap().len(), 2);
    }

    #[test]
    fn test_remove_file_out_of_range() {
        let mut session = Session::new();
        session.add_files(vec![image()]).unwrap();
        assert!(matches!(session.remove_file(3), Err(Error::NotFound(_))));
        session.remove_file(0).unwrap();
        assert!(session.upload().files().is_empty());
    }

    #[test]
    fn test_clear_records_returns_to_upload() {
        let mut session = Session::new();
        session.load_records(batch()).unwrap();
        assert_eq!(session.view(), ViewState::Dashboard);

        session.clear_records();
        assert!(session.records().is_empty());
        assert_eq!(session.view(), ViewState::Upload);
        assert_eq!(session.set_view(ViewState::Dashboard), ViewState::Upload);
    }

    #[test]
    fn test_load_rejects_invalid_record() {
        let mut session = Session::new();
        let bad = vec![ReceiptRecord::new("A", "yesterday", 1.0, "X")];
        assert!(session.load_records(bad).is_err());
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_dashboard_follows_selection() {
        let mut session = Session::new();
        session.load_records(batch()).unwrap();

        let view = session.dashboard();
        assert_eq!(view.summary.total_spent, 15.0);
        assert_eq!(view.summary.top_category.as_deref(), Some("Food"));
        assert_eq!(view.charts.len(), 2);
        assert_eq!(view.catalog.len(), 4);

        session.toggle_chart(ChartType::CategoryPie);
        session.toggle_chart(ChartType::DailyTrend);
        let view = session.dashboard();
        let shown: Vec<_> = view.charts.iter().map(|c| c.chart_type()).collect();
        assert_eq!(shown, vec![ChartType::MerchantBar, ChartType::DailyTrend]);
    }

    #[test]
    fn test_insights_cached_per_revision() {
        let mut session = Session::new();
        assert!(session.insights_request().is_none());

        session.load_records(batch()).unwrap();
        let request = session.insights_request().unwrap();
        assert!(session.insights_loading());
        assert_eq!(request.records.len(), 2);

        assert!(session.store_insights(request.revision, "ok".into()));
        assert_eq!(session.cached_insights(), Some("ok"));
        assert!(session.insights_request().is_none());

        session.load_records(vec![ReceiptRecord::new("C", "2024-01-03", 1.0, "X")]).unwrap();
        assert!(session.cached_insights().is_none());
        assert!(session.insights_request().is_some());
    }

    #[test]
    fn test_stale_insights_are_dropped() {
        let mut session = Session::new();
        session.load_records(batch()).unwrap();
        let request = session.insights_request().unwrap();
        session.clear_records();
        assert!(!session.store_insights(request.revision, "old".into()));
        assert!(session.cached_insights().is_none());
    }

    #[test]
    fn test_reminders_option_switches_view() {
        let mut session = Session::new();
        session.open_assistant();
        let outcome = session.select_option(AssistantOption::Reminders);
        assert!(matches!(outcome, OptionOutcome::ShowReminders));
        assert_eq!(session.view(), ViewState::Reminders);
        assert_eq!(session.conversation().mode(), AssistantMode::Idle);
    }

    #[test]
    fn test_canned_option_starts_turn() {
        let mut session = Session::new();
        session.open_assistant();
        let outcome = session.select_option(AssistantOption::DashboardAnalysis);
        let OptionOutcome::Turn { ticket, placeholder } = outcome else {
            panic!("expected a turn");
        };
        assert_eq!(placeholder, "Analizando tu dashboard...");
        assert!(ticket.history.is_empty());
        assert_eq!(session.conversation().pending(), 1);

        session.complete_turn(&ticket, "Resumen");
        assert_eq!(session.conversation().messages().len(), 2);
        assert_eq!(session.conversation().mode(), AssistantMode::Chat);
    }

    #[test]
    fn test_reminder_crud_through_session() {
        let mut session = Session::new();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(session.add_reminder(" ", today).is_none());
        let added = session.add_reminder("Pagar arriendo", today).unwrap();
        assert!(session.toggle_reminder(&added.id).unwrap().completed);
        session.delete_reminder(&added.id).unwrap();
        assert_eq!(session.reminders().len(), 2);
    }
}
