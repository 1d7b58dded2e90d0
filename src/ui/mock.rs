//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion, including progress bar activity.
//!
//! # Example
//!
//! ```
//! use ocaudit::ui::{MockUI, ProgressEvent, UserInterface};
//!
//! let mut ui = MockUI::new();
//! let mut progress = ui.start_progress(1);
//! progress.set_message("Cluster Version");
//! progress.advance();
//!
//! assert_eq!(
//!     ui.progress_events(),
//!     vec![
//!         ProgressEvent::Started(1),
//!         ProgressEvent::Message("Cluster Version".to_string()),
//!         ProgressEvent::Advanced,
//!     ]
//! );
//! ```

use std::sync::{Arc, Mutex};

use crate::checks::Verdict;

use super::{OutputMode, ProgressHandle, UserInterface};

/// Something that happened to a mock progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(usize),
    Message(String),
    Advanced,
    Finished(String),
}

type EventLog = Arc<Mutex<Vec<ProgressEvent>>>;

fn record(log: &EventLog, event: ProgressEvent) {
    if let Ok(mut events) = log.lock() {
        events.push(event);
    }
}

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    fields: Vec<(String, String)>,
    verdicts: Vec<(String, Verdict)>,
    progress: EventLog,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn verdicts(&self) -> &[(String, Verdict)] {
        &self.verdicts
    }

    /// Value of the first field shown under `key`.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every progress event across all bars, in order.
    pub fn progress_events(&self) -> Vec<ProgressEvent> {
        self.progress
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Whether any captured message contains `text`.
    pub fn has_message(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.contains(text))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_field(&mut self, key: &str, value: &str) {
        self.fields.push((key.to_string(), value.to_string()));
    }

    fn show_verdict(&mut self, title: &str, verdict: Verdict) {
        self.verdicts.push((title.to_string(), verdict));
    }

    fn start_progress(&mut self, total: usize) -> Box<dyn ProgressHandle> {
        record(&self.progress, ProgressEvent::Started(total));
        Box::new(MockProgress {
            log: Arc::clone(&self.progress),
        })
    }
}

/// Progress handle that records into its parent `MockUI`.
#[derive(Debug)]
pub struct MockProgress {
    log: EventLog,
}

impl ProgressHandle for MockProgress {
    fn set_message(&mut self, msg: &str) {
        record(&self.log, ProgressEvent::Message(msg.to_string()));
    }

    fn advance(&mut self) {
        record(&self.log, ProgressEvent::Advanced);
    }

    fn finish(&mut self, msg: &str) {
        record(&self.log, ProgressEvent::Finished(msg.to_string()));
    }
}
