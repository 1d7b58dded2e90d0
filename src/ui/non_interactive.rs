//! Line-oriented UI for CI and piped output.

use crate::checks::Verdict;

use super::{OutputMode, ProgressHandle, UserInterface};

/// UI implementation for non-interactive output.
///
/// No colors and no redrawing. Progress is printed as one line per check so
/// CI logs stay readable.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_field(&mut self, key: &str, value: &str) {
        println!("  {}: {}", key, value);
    }

    fn show_verdict(&mut self, title: &str, verdict: Verdict) {
        println!("  {:<45} {}", title, verdict);
    }

    fn start_progress(&mut self, total: usize) -> Box<dyn ProgressHandle> {
        Box::new(LineProgress {
            total,
            done: 0,
            enabled: self.mode.shows_progress(),
        })
    }
}

/// Prints `[n/total] message` for every started item.
struct LineProgress {
    total: usize,
    done: usize,
    enabled: bool,
}

impl ProgressHandle for LineProgress {
    fn set_message(&mut self, msg: &str) {
        if self.enabled {
            println!("[{}/{}] {}", self.done + 1, self.total, msg);
        }
    }

    fn advance(&mut self) {
        self.done += 1;
    }

    fn finish(&mut self, msg: &str) {
        if self.enabled {
            println!("✓ {}", msg);
        }
    }
}
