//! Marker substitution for a single check.
//!
//! A check owns two markers in the report: the summary anchor
//! `<<Title>>`, which sits on its own line in the summary table, and the
//! section heading `== Title`. Rendering appends a block after each matching
//! line and leaves every other line alone. Matching is by prefix and nothing
//! is replaced, so rendering the same check twice appends twice.

use crate::checks::{CheckEntry, CheckResult};

/// A check's result, ready to be spliced into the report.
#[derive(Debug, Clone, Copy)]
pub struct Substitution<'a> {
    pub entry: &'a CheckEntry,
    pub result: &'a CheckResult,
}

impl<'a> Substitution<'a> {
    pub fn new(entry: &'a CheckEntry, result: &'a CheckResult) -> Self {
        Self { entry, result }
    }

    /// Marker for the summary table row.
    pub fn summary_marker(&self) -> String {
        summary_marker(self.entry.title)
    }

    /// Marker for the detail section.
    pub fn heading_marker(&self) -> String {
        heading_marker(self.entry.title)
    }

    /// Render one template line.
    ///
    /// Returns `line` followed by a newline, plus the generated block when
    /// the line starts with one of this check's markers.
    pub fn render_line(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len() + 1);
        out.push_str(line);
        out.push('\n');

        if line.starts_with(&self.summary_marker()) {
            out.push_str(&self.summary_block());
        } else if line.starts_with(&self.heading_marker()) {
            out.push_str(&self.section_block());
        }

        out
    }

    /// Status and observation cells for the summary table.
    fn summary_block(&self) -> String {
        let verdict = self.result.verdict;
        format!(
            "|{{set:cellbgcolor:{}}}\n{}\n|{{set:cellbgcolor!}}\n{}\n",
            verdict.color(),
            verdict.label(),
            summary_line(&self.result.observation)
        )
    }

    /// Status table, observation, recommendation and references.
    fn section_block(&self) -> String {
        let verdict = self.result.verdict;
        let mut out = format!(
            "\n[cols=\"1\"]\n|===\n|{{set:cellbgcolor:{}}}\n{}\n|===\n{{set:cellbgcolor!}}\n",
            verdict.color(),
            verdict.label()
        );

        out.push_str("\n*Observation*\n\n");
        out.push_str(self.result.observation.trim_end());
        out.push('\n');

        out.push_str("\n*Recommendation*\n\n");
        match self.result.recommendation.trim() {
            "" => out.push_str("None."),
            text => out.push_str(text),
        }
        out.push('\n');

        if !self.entry.references.is_empty() {
            out.push_str("\n*Reference Links*\n\n");
            for link in self.entry.references {
                out.push_str(&format!("* {}\n", link));
            }
        }

        out
    }
}

/// `<<Title>>`
pub fn summary_marker(title: &str) -> String {
    format!("<<{}>>", title)
}

/// `== Title`
pub fn heading_marker(title: &str) -> String {
    format!("== {}", title)
}

/// First line of an observation, for the one-line summary cell.
fn summary_line(observation: &str) -> &str {
    observation
        .lines()
        .map(|l| l.trim_end_matches(':'))
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
}
