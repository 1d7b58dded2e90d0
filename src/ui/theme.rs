//! Visual theme and styling.

use console::Style;

use crate::checks::Verdict;

/// Colors used on the terminal.
#[derive(Debug, Clone)]
pub struct AuditTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warnings (yellow).
    pub warning: Style,
    /// Errors (red bold).
    pub error: Style,
    /// Progress and informational elements (cyan).
    pub info: Style,
    /// Secondary text.
    pub dim: Style,
    /// Headers (bold cyan).
    pub header: Style,
    /// Keys in key/value lines (bold).
    pub key: Style,
}

impl Default for AuditTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            key: Style::new().bold(),
        }
    }

    /// A theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            key: Style::new(),
        }
    }

    /// Pick colored or plain.
    pub fn for_terminal(colors: bool) -> Self {
        if colors {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// `key: value` with an aligned, bold key.
    pub fn format_field(&self, key: &str, value: &str) -> String {
        format!("  {} {}", self.key.apply_to(format!("{:<10}", format!("{}:", key))), value)
    }

    /// A verdict label in a color close to its report cell.
    pub fn format_verdict(&self, verdict: Verdict) -> String {
        let style = match verdict {
            Verdict::NoChange => &self.success,
            Verdict::Recommended => &self.warning,
            Verdict::Required => &self.error,
            Verdict::Advisory => &self.info,
            Verdict::NotApplicable | Verdict::ToEvaluate => &self.dim,
        };
        format!("{}", style.apply_to(verdict.label()))
    }
}

/// Whether to emit ANSI colors on stdout.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_formats() {
        let theme = AuditTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_error("bad"), "✗ bad");
        assert_eq!(theme.format_warning("hmm"), "⚠ hmm");
    }

    #[test]
    fn plain_verdict_is_label() {
        let theme = AuditTheme::plain();
        assert_eq!(theme.format_verdict(Verdict::Required), "Changes Required");
    }

    #[test]
    fn field_alignment() {
        let theme = AuditTheme::plain();
        assert_eq!(theme.format_field("Cluster", "prod"), "  Cluster:   prod");
    }
}
