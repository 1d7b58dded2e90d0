//! Sequential check execution.
//!
//! Checks run one at a time in registry order. Each result is rendered into
//! the report before the next check starts. A failing check never stops the
//! run; it is logged and recorded as needing manual evaluation.

use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::checks::{validate_names, CheckContext, CheckEntry, CheckResult};
use crate::error::Result;
use crate::report::{ReportDocument, Substitution};
use crate::ui::UserInterface;

use super::summary::{CheckOutcome, OutcomeStatus, RunSummary};

const SKIPPED_OBSERVATION: &str = "Check skipped for this run.";

/// Options for an audit run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run these checks (all when empty).
    pub only: HashSet<String>,
    /// Skip these checks.
    pub skip: HashSet<String>,
    /// Pause between checks.
    pub delay: Duration,
}

impl RunOptions {
    /// Build options, rejecting unknown check names.
    pub fn new(only: &[String], skip: &[String], delay: Duration) -> Result<Self> {
        validate_names(only)?;
        validate_names(skip)?;

        Ok(Self {
            only: only.iter().cloned().collect(),
            skip: skip.iter().cloned().collect(),
            delay,
        })
    }

    /// Whether a check runs under these options.
    pub fn selects(&self, name: &str) -> bool {
        (self.only.is_empty() || self.only.contains(name)) && !self.skip.contains(name)
    }
}

/// Runs checks against a cluster and renders each result into the report.
pub struct AuditRunner<'a> {
    entries: &'a [CheckEntry],
    options: RunOptions,
}

impl<'a> AuditRunner<'a> {
    pub fn new(entries: &'a [CheckEntry], options: RunOptions) -> Self {
        Self { entries, options }
    }

    /// Number of checks that will actually execute.
    pub fn selected_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| self.options.selects(e.name))
            .count()
    }

    /// Run every check in order.
    pub fn run(
        &self,
        ctx: &CheckContext,
        document: &mut ReportDocument,
        ui: &mut dyn UserInterface,
    ) -> RunSummary {
        let start = Instant::now();
        let total = self.selected_count();
        let mut progress = ui.start_progress(total);
        let mut outcomes = Vec::with_capacity(self.entries.len());
        let mut executed = 0;

        for entry in self.entries {
            if !self.options.selects(entry.name) {
                debug!("skipping {}", entry.name);
                let result = CheckResult::to_evaluate(SKIPPED_OBSERVATION);
                document.apply(&Substitution::new(entry, &result));
                outcomes.push(CheckOutcome {
                    name: entry.name,
                    title: entry.title,
                    category: entry.category,
                    status: OutcomeStatus::Skipped,
                    result,
                    duration: Duration::ZERO,
                });
                continue;
            }

            if executed > 0 && !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }
            executed += 1;

            progress.set_message(entry.title);
            let check_start = Instant::now();
            let (status, result) = match entry.run(ctx) {
                Ok(result) => (OutcomeStatus::Completed, result),
                Err(e) => {
                    warn!("check {} failed: {}", entry.name, e);
                    (
                        OutcomeStatus::Failed,
                        CheckResult::to_evaluate(format!(
                            "The check could not be completed: {}",
                            e
                        )),
                    )
                }
            };
            let duration = check_start.elapsed();
            debug!("{} -> {} in {:?}", entry.name, result.verdict, duration);

            document.apply(&Substitution::new(entry, &result));
            progress.advance();

            outcomes.push(CheckOutcome {
                name: entry.name,
                title: entry.title,
                category: entry.category,
                status,
                result,
                duration,
            });
        }

        progress.finish(&format!("Ran {} of {} checks", executed, self.entries.len()));

        RunSummary {
            outcomes,
            duration: start.elapsed(),
        }
    }
}
