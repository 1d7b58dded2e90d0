//! Interactive terminal UI.

use std::io::Write;

use console::Term;

use crate::checks::Verdict;

use super::{
    AuditTheme, CheckProgress, NonInteractiveUI, OutputMode, ProgressHandle, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: AuditTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            term: Term::stdout(),
            theme: AuditTheme::for_terminal(colors),
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        let err = Term::stderr();
        writeln!(&err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_field(&mut self, key: &str, value: &str) {
        writeln!(self.term, "{}", self.theme.format_field(key, value)).ok();
    }

    fn show_verdict(&mut self, title: &str, verdict: Verdict) {
        writeln!(self.term, "  {:<45} {}", title, self.theme.format_verdict(verdict)).ok();
    }

    fn start_progress(&mut self, total: usize) -> Box<dyn ProgressHandle> {
        if self.mode.shows_progress() {
            Box::new(CheckProgress::new(total, self.theme.clone()))
        } else {
            Box::new(CheckProgress::hidden(total))
        }
    }
}

/// Terminal UI when stdout is a TTY, plain line output otherwise.
pub fn create_ui(mode: OutputMode, colors: bool) -> Box<dyn UserInterface> {
    if Term::stdout().is_term() && !crate::shell::is_ci() {
        Box::new(TerminalUI::new(mode, colors))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_terminal_hides_progress() {
        let mut ui = TerminalUI::new(OutputMode::Quiet, false);
        let mut progress = ui.start_progress(2);
        progress.advance();
        progress.finish("done");
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
