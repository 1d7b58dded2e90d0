//! The check catalogue.
//!
//! Every check is a plain function from a [`CheckContext`] to a
//! [`CheckResult`]. [`registry`] returns them in the order they run and
//! appear in the report. Checks never write to the report themselves; the
//! runner renders each result once it is returned.

pub mod cluster_config;
pub mod networking;
pub mod observability;
pub mod operations;
pub mod result;
pub mod security;
pub mod storage;
pub mod support;
pub mod workloads;

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::cluster::ClusterQuery;
use crate::config::Thresholds;
use crate::error::{AuditError, Result};
use crate::releases::ReleaseFeed;

pub use result::{CheckResult, Verdict};

/// Report grouping for a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ClusterConfig,
    Security,
    Networking,
    Storage,
    Operations,
    Observability,
    Applications,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClusterConfig => "Cluster Config",
            Self::Security => "Security",
            Self::Networking => "Networking",
            Self::Storage => "Storage",
            Self::Operations => "Operations",
            Self::Observability => "Logging & Monitoring",
            Self::Applications => "Applications",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a check may consult.
pub struct CheckContext<'a> {
    pub cluster: &'a dyn ClusterQuery,
    pub releases: &'a dyn ReleaseFeed,
    pub thresholds: &'a Thresholds,
}

/// Signature shared by all checks.
pub type CheckFn = fn(&CheckContext) -> Result<CheckResult>;

/// A registered check.
#[derive(Debug, Clone, Copy)]
pub struct CheckEntry {
    /// Stable identifier used by `--only` and `--skip`.
    pub name: &'static str,
    /// Title as it appears in the report template.
    pub title: &'static str,
    pub category: Category,
    /// Documentation links listed under the finding.
    pub references: &'static [&'static str],
    pub run: CheckFn,
}

impl CheckEntry {
    /// Run the check.
    pub fn run(&self, ctx: &CheckContext) -> Result<CheckResult> {
        (self.run)(ctx)
    }
}

/// All checks in execution order.
pub fn registry() -> Vec<CheckEntry> {
    let mut entries = cluster_config::entries();
    entries.extend(security::entries());
    entries.extend(networking::entries());
    entries.extend(storage::entries());
    entries.extend(operations::entries());
    entries.extend(observability::entries());
    entries.extend(workloads::entries());
    entries
}

/// Look up a check by name.
pub fn find(name: &str) -> Option<CheckEntry> {
    registry().into_iter().find(|e| e.name == name)
}

/// Reject check names that are not registered.
///
/// # Errors
///
/// Returns `ConfigValidationError` naming every unknown check.
pub fn validate_names(names: &[String]) -> Result<()> {
    let known: HashSet<&str> = registry().iter().map(|e| e.name).collect();
    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !known.contains(n))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(AuditError::ConfigValidationError {
            message: format!(
                "unknown check(s): {}. Run `ocaudit list` to see available checks",
                unknown.join(", ")
            ),
        })
    }
}

/// Fixtures shared by check unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::*;
    use crate::cluster::FakeCluster;

    /// Release feed answering from a fixed table.
    pub struct StaticFeed {
        channels: HashMap<String, String>,
    }

    impl StaticFeed {
        pub fn new(channels: &[(&str, &str)]) -> Self {
            Self {
                channels: channels
                    .iter()
                    .map(|(c, v)| (c.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl ReleaseFeed for StaticFeed {
        fn latest(&self, channel: &str) -> Result<String> {
            self.channels
                .get(channel)
                .cloned()
                .ok_or_else(|| AuditError::ReleaseFeed {
                    channel: channel.to_string(),
                    message: "unknown channel".to_string(),
                })
        }
    }

    pub fn context<'a>(
        cluster: &'a FakeCluster,
        feed: &'a StaticFeed,
        thresholds: &'a Thresholds,
    ) -> CheckContext<'a> {
        CheckContext {
            cluster,
            releases: feed,
            thresholds,
        }
    }

    /// Run a check with default thresholds, panicking on error.
    pub fn run_check(check: CheckFn, cluster: &FakeCluster, feed: &StaticFeed) -> CheckResult {
        let thresholds = Thresholds::default();
        check(&context(cluster, feed, &thresholds)).unwrap()
    }

    /// Run a check with default thresholds and return its error.
    pub fn run_check_err(check: CheckFn, cluster: &FakeCluster) -> AuditError {
        let thresholds = Thresholds::default();
        let feed = StaticFeed::new(&[]);
        check(&context(cluster, &feed, &thresholds)).unwrap_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_full_catalogue() {
        assert_eq!(registry().len(), 54);
    }

    #[test]
    fn names_and_titles_are_unique() {
        let entries = registry();
        let names: HashSet<_> = entries.iter().map(|e| e.name).collect();
        let titles: HashSet<_> = entries.iter().map(|e| e.title).collect();
        assert_eq!(names.len(), entries.len());
        assert_eq!(titles.len(), entries.len());
    }

    #[test]
    fn no_title_is_prefix_of_another() {
        let entries = registry();
        for a in &entries {
            for b in &entries {
                if a.name != b.name {
                    assert!(
                        !b.title.starts_with(a.title),
                        "{} is a prefix of {}",
                        a.title,
                        b.title
                    );
                }
            }
        }
    }

    #[test]
    fn order_starts_with_cluster_version() {
        let entries = registry();
        assert_eq!(entries[0].name, "cluster-version");
        assert_eq!(entries.last().map(|e| e.name), Some("operator-approval"));
    }

    #[test]
    fn categories_are_contiguous() {
        let entries = registry();
        let mut seen = Vec::new();
        for entry in &entries {
            if seen.last() != Some(&entry.category) {
                assert!(!seen.contains(&entry.category), "{} split", entry.category);
                seen.push(entry.category);
            }
        }
    }

    #[test]
    fn validate_names_reports_unknown() {
        assert!(validate_names(&["node-status".to_string()]).is_ok());
        let err = validate_names(&["node-status".into(), "bogus".into()]).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn find_by_name() {
        assert_eq!(find("etcd-health").map(|e| e.title), Some("ETCD Health"));
        assert!(find("nope").is_none());
    }
}
