//! Configuration file schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cluster::Transport;
use crate::releases::DEFAULT_MIRROR;

/// Contents of `ocaudit.yml`.
///
/// Every field is optional; command-line flags override file values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Customer or organization name printed on the report.
    pub customer: Option<String>,

    /// Directory the report is written to.
    pub output_dir: Option<PathBuf>,

    /// Custom AsciiDoc template replacing the built-in one.
    pub template: Option<PathBuf>,

    /// How to reach the cluster.
    pub transport: Option<Transport>,

    /// Path or name of the `oc` binary.
    pub oc_binary: Option<String>,

    /// Pause between checks in milliseconds.
    pub delay_ms: Option<u64>,

    /// Base URL for release channel lookups.
    pub release_mirror: Option<String>,

    /// Check names to skip.
    #[serde(default)]
    pub skip: Vec<String>,

    /// Verdict thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Tunable limits used by individual checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Minimum dedicated infrastructure nodes.
    pub min_infra_nodes: usize,

    /// Minimum available default ingress controller replicas.
    pub min_ingress_replicas: u64,

    /// Cluster-admin bindings to non-system subjects before flagging.
    pub max_cluster_admins: usize,

    /// Cap on items listed in a single observation.
    pub max_listed_items: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_infra_nodes: 3,
            min_ingress_replicas: 2,
            max_cluster_admins: 5,
            max_listed_items: 10,
        }
    }
}

/// Fully resolved settings for one audit run.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSettings {
    pub customer: String,
    pub output_dir: PathBuf,
    pub template: Option<PathBuf>,
    pub transport: Transport,
    pub oc_binary: String,
    pub delay_ms: u64,
    pub release_mirror: String,
    pub skip: Vec<String>,
    pub only: Vec<String>,
    pub archive: Option<PathBuf>,
    pub create_archive: bool,
    pub thresholds: Thresholds,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            customer: "Customer".to_string(),
            output_dir: PathBuf::from("health-check"),
            template: None,
            transport: Transport::default(),
            oc_binary: "oc".to_string(),
            delay_ms: 100,
            release_mirror: DEFAULT_MIRROR.to_string(),
            skip: Vec::new(),
            only: Vec::new(),
            archive: None,
            create_archive: true,
            thresholds: Thresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
customer: Acme Corp
output_dir: reports/acme
transport: oc
oc_binary: /usr/local/bin/oc
delay_ms: 0
skip: [etcd-backup, alert-receivers]
thresholds:
  min_infra_nodes: 2
"#;
        let config: AuditConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.customer.as_deref(), Some("Acme Corp"));
        assert_eq!(config.transport, Some(Transport::Oc));
        assert_eq!(config.delay_ms, Some(0));
        assert_eq!(config.skip.len(), 2);
        assert_eq!(config.thresholds.min_infra_nodes, 2);
        assert_eq!(config.thresholds.max_listed_items, 10);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: AuditConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn unknown_field_rejected() {
        let result: std::result::Result<AuditConfig, _> = serde_yaml::from_str("costumer: typo\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_transport_rejected() {
        let result: std::result::Result<AuditConfig, _> = serde_yaml::from_str("transport: grpc\n");
        assert!(result.is_err());
    }

    #[test]
    fn settings_defaults() {
        let settings = AuditSettings::default();
        assert_eq!(settings.output_dir, PathBuf::from("health-check"));
        assert_eq!(settings.delay_ms, 100);
        assert!(settings.create_archive);
        assert_eq!(settings.release_mirror, DEFAULT_MIRROR);
    }
}
