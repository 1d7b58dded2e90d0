//! Terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands and the runner never print directly
//! - [`TerminalUI`] for interactive terminals (colors, live progress bar)
//! - [`NonInteractiveUI`] for CI and piped output
//! - [`MockUI`] which records everything for assertions in tests
//!
//! # Example
//!
//! ```
//! use ocaudit::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Health check");
//! ui.success("Report written");
//! assert_eq!(ui.successes(), ["Report written"]);
//! ```

use crate::checks::Verdict;

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use mock::{MockProgress, MockUI, ProgressEvent};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::{format_duration, CheckProgress};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, AuditTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a plain message.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a key/value line (cluster name, report path, ...).
    fn show_field(&mut self, key: &str, value: &str);

    /// Show one check's verdict on its own line.
    fn show_verdict(&mut self, title: &str, verdict: Verdict);

    /// Start a progress indicator over `total` items.
    fn start_progress(&mut self, total: usize) -> Box<dyn ProgressHandle>;
}

/// Handle for a running progress indicator.
pub trait ProgressHandle {
    /// Show what is being worked on.
    fn set_message(&mut self, msg: &str);

    /// Mark one more item complete.
    fn advance(&mut self);

    /// Remove the indicator and print a closing line.
    fn finish(&mut self, msg: &str);
}
