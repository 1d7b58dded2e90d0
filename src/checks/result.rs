//! Verdicts and check results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Configuration follows recommended practice.
    NoChange,
    /// A change is recommended.
    Recommended,
    /// A change is required.
    Required,
    /// Informational; worth a conversation.
    Advisory,
    /// Does not apply to this cluster.
    NotApplicable,
    /// Could not be determined automatically.
    ToEvaluate,
}

impl Verdict {
    /// All verdicts in report legend order.
    pub const ALL: [Verdict; 6] = [
        Verdict::NoChange,
        Verdict::Recommended,
        Verdict::Required,
        Verdict::Advisory,
        Verdict::NotApplicable,
        Verdict::ToEvaluate,
    ];

    /// Label shown in the report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoChange => "No Change",
            Self::Recommended => "Changes Recommended",
            Self::Required => "Changes Required",
            Self::Advisory => "Advisory",
            Self::NotApplicable => "Not Applicable",
            Self::ToEvaluate => "To Be Evaluated",
        }
    }

    /// Cell background color used in the report.
    pub fn color(&self) -> &'static str {
        match self {
            Self::NoChange => "#00FF00",
            Self::Recommended => "#FEFE20",
            Self::Required => "#FF0000",
            Self::Advisory => "#80E5FF",
            Self::NotApplicable => "#A6B9BF",
            Self::ToEvaluate => "#FFFFFF",
        }
    }

    /// Whether the cluster needs attention for this verdict.
    pub fn needs_action(&self) -> bool {
        matches!(self, Self::Recommended | Self::Required)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a check found and what it suggests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub verdict: Verdict,
    pub observation: String,
    pub recommendation: String,
}

impl CheckResult {
    /// Create a result.
    pub fn new(
        verdict: Verdict,
        observation: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            verdict,
            observation: observation.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Nothing to change.
    pub fn no_change(observation: impl Into<String>) -> Self {
        Self::new(Verdict::NoChange, observation, "")
    }

    /// A change is recommended.
    pub fn recommended(observation: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(Verdict::Recommended, observation, recommendation)
    }

    /// A change is required.
    pub fn required(observation: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(Verdict::Required, observation, recommendation)
    }

    /// Informational finding.
    pub fn advisory(observation: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(Verdict::Advisory, observation, recommendation)
    }

    /// Check does not apply.
    pub fn not_applicable(observation: impl Into<String>) -> Self {
        Self::new(Verdict::NotApplicable, observation, "")
    }

    /// Needs a human to look.
    pub fn to_evaluate(observation: impl Into<String>) -> Self {
        Self::new(
            Verdict::ToEvaluate,
            observation,
            "Review this item manually.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<_> = Verdict::ALL.iter().map(|v| v.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Verdict::ALL.len());
    }

    #[test]
    fn needs_action_only_for_changes() {
        assert!(Verdict::Required.needs_action());
        assert!(Verdict::Recommended.needs_action());
        assert!(!Verdict::Advisory.needs_action());
        assert!(!Verdict::NoChange.needs_action());
    }

    #[test]
    fn serializes_kebab_case() {
        let json = serde_json::to_string(&Verdict::NotApplicable).unwrap();
        assert_eq!(json, "\"not-applicable\"");
    }

    #[test]
    fn constructors_set_verdict() {
        assert_eq!(CheckResult::no_change("ok").verdict, Verdict::NoChange);
        assert_eq!(CheckResult::required("x", "y").recommendation, "y");
        assert_eq!(
            CheckResult::to_evaluate("unknown").verdict,
            Verdict::ToEvaluate
        );
        assert!(CheckResult::not_applicable("n/a").recommendation.is_empty());
    }
}
