//! Check progress bar.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::theme::AuditTheme;
use super::ProgressHandle;

const BAR_TEMPLATE: &str = "{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// An indicatif progress bar over the check list.
pub struct CheckProgress {
    bar: ProgressBar,
    theme: AuditTheme,
}

impl CheckProgress {
    /// Create a visible bar over `total` checks.
    pub fn new(total: usize, theme: AuditTheme) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, theme }
    }

    /// A bar that draws nothing (quiet mode).
    pub fn hidden(total: usize) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: AuditTheme::plain(),
        }
        .with_length(total)
    }

    fn with_length(self, total: usize) -> Self {
        self.bar.set_length(total as u64);
        self
    }

    /// Completed count.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressHandle for CheckProgress {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn advance(&mut self) {
        self.bar.inc(1);
    }

    fn finish(&mut self, msg: &str) {
        self.bar.finish_and_clear();
        if !self.bar.is_hidden() {
            println!("{}", self.theme.format_success(msg));
        }
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{}m {}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}
