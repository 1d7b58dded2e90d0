//! Cluster logging and monitoring stack checks.
//!
//! Monitoring settings live in the `cluster-monitoring-config` ConfigMap as an
//! embedded YAML document; Alertmanager routing lives in a base64-encoded
//! secret. Both are decoded here into JSON values so the usual pointer
//! helpers apply.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use super::support::{
    array, bullet_list, find_subscription, name, non_empty, plural, selects_infra, text,
};
use super::{Category, CheckContext, CheckEntry, CheckResult};
use crate::cluster::{resource, Selector};
use crate::error::{AuditError, Result};

const LOGGING_NAMESPACE: &str = "openshift-logging";
const MONITORING_NAMESPACE: &str = "openshift-monitoring";
const MONITORING_CONFIG: &str = "cluster-monitoring-config";
const ALERTMANAGER_SECRET: &str = "alertmanager-main";

/// Components of the platform monitoring stack that accept a node selector.
const MONITORING_COMPONENTS: &[&str] = &[
    "prometheusOperator",
    "prometheusK8s",
    "alertmanagerMain",
    "kubeStateMetrics",
    "openshiftStateMetrics",
    "telemeterClient",
    "thanosQuerier",
];

pub(super) fn entries() -> Vec<CheckEntry> {
    vec![
        CheckEntry {
            name: "logging-operator",
            title: "Cluster Logging",
            category: Category::Observability,
            references: &[
                "https://docs.openshift.com/container-platform/latest/logging/cluster-logging-deploying.html",
            ],
            run: logging_operator,
        },
        CheckEntry {
            name: "logging-health",
            title: "Logging Health",
            category: Category::Observability,
            references: &[
                "https://docs.openshift.com/container-platform/latest/logging/troubleshooting/cluster-logging-cluster-status.html",
            ],
            run: logging_health,
        },
        CheckEntry {
            name: "log-forwarding",
            title: "Log Forwarding",
            category: Category::Observability,
            references: &[
                "https://docs.openshift.com/container-platform/latest/logging/log_collection_forwarding/log-forwarding.html",
            ],
            run: log_forwarding,
        },
        CheckEntry {
            name: "monitoring-storage",
            title: "Monitoring Persistent Storage",
            category: Category::Observability,
            references: &[
                "https://docs.openshift.com/container-platform/latest/monitoring/configuring-the-monitoring-stack.html#configuring-persistent-storage",
            ],
            run: monitoring_storage,
        },
        CheckEntry {
            name: "monitoring-placement",
            title: "Monitoring Placement",
            category: Category::Observability,
            references: &[
                "https://docs.openshift.com/container-platform/latest/monitoring/configuring-the-monitoring-stack.html#moving-monitoring-components-to-different-nodes_configuring-the-monitoring-stack",
            ],
            run: monitoring_placement,
        },
        CheckEntry {
            name: "user-workload-monitoring",
            title: "User Workload Monitoring",
            category: Category::Observability,
            references: &[
                "https://docs.openshift.com/container-platform/latest/monitoring/enabling-monitoring-for-user-defined-projects.html",
            ],
            run: user_workload_monitoring,
        },
        CheckEntry {
            name: "alert-receivers",
            title: "Alertmanager Receivers",
            category: Category::Observability,
            references: &[
                "https://docs.openshift.com/container-platform/latest/monitoring/managing-alerts.html#sending-notifications-to-external-systems_managing-alerts",
            ],
            run: alert_receivers,
        },
    ]
}

fn logging_installed(ctx: &CheckContext) -> Result<bool> {
    Ok(find_subscription(ctx.cluster, "cluster-logging")?.is_some())
}

fn not_installed() -> CheckResult {
    CheckResult::not_applicable("OpenShift Logging is not installed.")
}

/// Parse the embedded `config.yaml` of the cluster monitoring ConfigMap.
///
/// A missing ConfigMap means the stack runs with defaults, which is an empty
/// document.
fn monitoring_config(ctx: &CheckContext) -> Result<Value> {
    let Some(config_map) = ctx.cluster.find(
        &resource::CONFIG_MAP,
        Some(MONITORING_NAMESPACE),
        MONITORING_CONFIG,
    )?
    else {
        return Ok(json!({}));
    };

    parse_monitoring_config(text(&config_map, "/data/config.yaml").unwrap_or_default())
}

fn parse_monitoring_config(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }

    let config: Value = serde_yaml::from_str(raw).map_err(|e| {
        AuditError::unexpected(
            &format!("ConfigMap {}/{}", MONITORING_NAMESPACE, MONITORING_CONFIG),
            e.to_string(),
        )
    })?;

    Ok(if config.is_null() { json!({}) } else { config })
}

/// Decode `alertmanager.yaml` from the Alertmanager secret.
fn alertmanager_config(secret: &Value) -> Result<Value> {
    let resource = format!("Secret {}/{}", MONITORING_NAMESPACE, ALERTMANAGER_SECRET);
    let encoded = text(secret, "/data/alertmanager.yaml")
        .ok_or_else(|| AuditError::unexpected(&resource, "alertmanager.yaml key is missing"))?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuditError::unexpected(&resource, e.to_string()))?;
    let raw =
        String::from_utf8(decoded).map_err(|e| AuditError::unexpected(&resource, e.to_string()))?;

    serde_yaml::from_str(&raw).map_err(|e| AuditError::unexpected(&resource, e.to_string()))
}

fn logging_operator(ctx: &CheckContext) -> Result<CheckResult> {
    match find_subscription(ctx.cluster, "cluster-logging")? {
        Some(sub) => Ok(CheckResult::no_change(format!(
            "OpenShift Logging is installed from channel {}.",
            text(&sub, "/spec/channel").unwrap_or("unknown")
        ))),
        None => Ok(CheckResult::recommended(
            "OpenShift Logging is not installed.",
            "Install OpenShift Logging to collect and retain application, infrastructure and audit logs.",
        )),
    }
}

fn logging_health(ctx: &CheckContext) -> Result<CheckResult> {
    if !logging_installed(ctx)? {
        return Ok(not_installed());
    }

    let pods = ctx
        .cluster
        .list(&resource::POD, &Selector::namespace(LOGGING_NAMESPACE))?;
    let unhealthy: Vec<String> = pods
        .iter()
        .filter_map(|pod| match text(pod, "/status/phase") {
            Some("Running" | "Succeeded") => None,
            phase => Some(format!("{} ({})", name(pod), phase.unwrap_or("Unknown"))),
        })
        .collect();

    if unhealthy.is_empty() {
        Ok(CheckResult::no_change(format!(
            "All {} in {} are running.",
            plural(pods.len(), "pod"),
            LOGGING_NAMESPACE
        )))
    } else {
        Ok(CheckResult::required(
            format!(
                "Unhealthy logging pods:\n\n{}",
                bullet_list(&unhealthy, ctx.thresholds.max_listed_items)
            ),
            "Investigate the collector and log store pods; logs may be lost while they are down.",
        ))
    }
}

fn log_forwarding(ctx: &CheckContext) -> Result<CheckResult> {
    if !logging_installed(ctx)? {
        return Ok(not_installed());
    }

    let forwarders = ctx
        .cluster
        .list(&resource::CLUSTER_LOG_FORWARDER, &Selector::namespace(LOGGING_NAMESPACE))?;
    let outputs: Vec<String> = forwarders
        .iter()
        .flat_map(|f| array(f, "/spec/outputs").iter())
        .map(|o| {
            format!(
                "{} ({})",
                text(o, "/name").unwrap_or("unnamed"),
                text(o, "/type").unwrap_or("unknown")
            )
        })
        .collect();

    if outputs.is_empty() {
        Ok(CheckResult::advisory(
            "Logs are not forwarded outside the cluster.",
            "Forward audit and application logs to an external store for retention.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "Log forwarding outputs:\n\n{}",
            bullet_list(&outputs, ctx.thresholds.max_listed_items)
        )))
    }
}

fn monitoring_storage(ctx: &CheckContext) -> Result<CheckResult> {
    let config = monitoring_config(ctx)?;
    let missing: Vec<&str> = ["prometheusK8s", "alertmanagerMain"]
        .into_iter()
        .filter(|component| {
            config
                .get(component)
                .and_then(|c| c.get("volumeClaimTemplate"))
                .is_none()
        })
        .collect();

    if missing.is_empty() {
        Ok(CheckResult::no_change(
            "Prometheus and Alertmanager use persistent volumes.",
        ))
    } else {
        Ok(CheckResult::recommended(
            format!("No persistent storage for: {}.", missing.join(", ")),
            "Configure volume claim templates so metrics and silences survive pod restarts.",
        ))
    }
}

fn monitoring_placement(ctx: &CheckContext) -> Result<CheckResult> {
    let config = monitoring_config(ctx)?;
    let floating: Vec<&str> = MONITORING_COMPONENTS
        .iter()
        .copied()
        .filter(|component| {
            !selects_infra(config.get(component).and_then(|c| c.get("nodeSelector")))
        })
        .collect();

    if floating.is_empty() {
        Ok(CheckResult::no_change(
            "All monitoring components run on infrastructure nodes.",
        ))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "Monitoring components not pinned to infrastructure nodes:\n\n{}",
                bullet_list(&floating, ctx.thresholds.max_listed_items)
            ),
            "Add node selectors and tolerations for each component in cluster-monitoring-config.",
        ))
    }
}

fn user_workload_monitoring(ctx: &CheckContext) -> Result<CheckResult> {
    let config = monitoring_config(ctx)?;

    if config.get("enableUserWorkload").and_then(Value::as_bool) == Some(true) {
        Ok(CheckResult::no_change(
            "Monitoring for user-defined projects is enabled.",
        ))
    } else {
        Ok(CheckResult::advisory(
            "Monitoring for user-defined projects is disabled.",
            "Enable user workload monitoring if application teams need their own metrics and alerts.",
        ))
    }
}

fn alert_receivers(ctx: &CheckContext) -> Result<CheckResult> {
    let secret = ctx.cluster.get(
        &resource::SECRET,
        Some(MONITORING_NAMESPACE),
        ALERTMANAGER_SECRET,
    )?;
    let config = alertmanager_config(&secret)?;

    let configured: Vec<String> = array(&config, "/receivers")
        .iter()
        .filter_map(|receiver| {
            let integrations: Vec<&str> = receiver
                .as_object()?
                .iter()
                .filter(|(key, value)| {
                    key.ends_with("_configs") && value.as_array().is_some_and(|a| !a.is_empty())
                })
                .map(|(key, _)| key.trim_end_matches("_configs"))
                .collect();
            (!integrations.is_empty()).then(|| {
                format!(
                    "{} ({})",
                    non_empty(receiver, "/name").unwrap_or("unnamed"),
                    integrations.join(", ")
                )
            })
        })
        .collect();

    if configured.is_empty() {
        Ok(CheckResult::recommended(
            "No Alertmanager receiver sends notifications anywhere.",
            "Configure at least one receiver (email, PagerDuty, webhook, ...) for critical alerts.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "Configured receivers:\n\n{}",
            bullet_list(&configured, ctx.thresholds.max_listed_items)
        )))
    }
}
