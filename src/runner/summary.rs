//! Per-check outcomes and run totals.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::checks::{Category, CheckResult, Verdict};
use crate::error::Result;

/// How a check's result came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    /// The check ran and returned a verdict.
    Completed,
    /// The check raised an error; the result says so.
    Failed,
    /// The check was not selected for this run.
    Skipped,
}

/// What one check produced.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub status: OutcomeStatus,
    #[serde(flatten)]
    pub result: CheckResult,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

/// Ordered outcomes of a full run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<CheckOutcome>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl RunSummary {
    /// Number of outcomes with `verdict`.
    pub fn count(&self, verdict: Verdict) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.verdict == verdict)
            .count()
    }

    /// Count per verdict, in report legend order, omitting zeros.
    pub fn counts(&self) -> Vec<(Verdict, usize)> {
        Verdict::ALL
            .iter()
            .map(|v| (*v, self.count(*v)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    pub fn count_status(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Outcomes that recommend or require a change.
    pub fn needing_action(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| o.result.verdict.needs_action())
    }

    /// Write the outcomes as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;
        fs::write(path, json)?;
        Ok(())
    }
}
