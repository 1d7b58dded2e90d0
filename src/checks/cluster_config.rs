//! Cluster configuration checks: version, operators, nodes and machines.

use std::collections::BTreeSet;

use serde_json::Value;

use super::support::{
    array, bullet_list, condition, condition_true, flag, has_label, name, non_empty, plural, text,
    INFRA_LABEL,
};
use super::{Category, CheckContext, CheckEntry, CheckResult};
use crate::cluster::{resource, Selector};
use crate::error::{AuditError, Result};
use crate::releases::ReleaseVersion;

const MASTER_LABEL: &str = "node-role.kubernetes.io/master";
const CONTROL_PLANE_LABEL: &str = "node-role.kubernetes.io/control-plane";
const WORKER_LABEL: &str = "node-role.kubernetes.io/worker";

pub(super) fn entries() -> Vec<CheckEntry> {
    vec![
        CheckEntry {
            name: "cluster-version",
            title: "Cluster Version",
            category: Category::ClusterConfig,
            references: &[
                "https://access.redhat.com/support/policy/updates/openshift",
                "https://docs.openshift.com/container-platform/latest/updating/index.html",
            ],
            run: cluster_version,
        },
        CheckEntry {
            name: "update-channel",
            title: "Update Channel",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/updating/understanding_updates/understanding-update-channels-release.html",
            ],
            run: update_channel,
        },
        CheckEntry {
            name: "upgrade-history",
            title: "Upgrade History",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/updating/troubleshooting_updates/gathering-data-cluster-update.html",
            ],
            run: upgrade_history,
        },
        CheckEntry {
            name: "cluster-operators",
            title: "Cluster Operators",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/support/troubleshooting/troubleshooting-operator-issues.html",
            ],
            run: cluster_operators,
        },
        CheckEntry {
            name: "infrastructure-provider",
            title: "Infrastructure Provider",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/installing/installing-preparing.html",
            ],
            run: infrastructure_provider,
        },
        CheckEntry {
            name: "vmware-failure-domains",
            title: "VMware Failure Domains",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/installing/installing_vsphere/post-install-vsphere-zones-regions-configuration.html",
            ],
            run: vmware_failure_domains,
        },
        CheckEntry {
            name: "vmware-csi-driver",
            title: "VMware CSI Driver",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/storage/container_storage_interface/persistent-storage-csi-vsphere.html",
            ],
            run: vmware_csi_driver,
        },
        CheckEntry {
            name: "node-status",
            title: "Node Status",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/nodes/nodes/nodes-nodes-viewing.html",
            ],
            run: node_status,
        },
        CheckEntry {
            name: "control-plane-nodes",
            title: "Control Plane Nodes",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/architecture/control-plane.html",
            ],
            run: control_plane_nodes,
        },
        CheckEntry {
            name: "control-plane-schedulable",
            title: "Control Plane Schedulability",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/nodes/nodes/nodes-nodes-managing.html",
            ],
            run: control_plane_schedulable,
        },
        CheckEntry {
            name: "infrastructure-nodes",
            title: "Infrastructure Nodes",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/machine_management/creating-infrastructure-machinesets.html",
            ],
            run: infrastructure_nodes,
        },
        CheckEntry {
            name: "node-os-consistency",
            title: "Node OS Consistency",
            category: Category::ClusterConfig,
            references: &[],
            run: node_os_consistency,
        },
        CheckEntry {
            name: "machine-config-pools",
            title: "Machine Config Pools",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/post_installation_configuration/machine-configuration-tasks.html",
            ],
            run: machine_config_pools,
        },
        CheckEntry {
            name: "machine-health-checks",
            title: "Machine Health Checks",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/machine_management/deploying-machine-health-checks.html",
            ],
            run: machine_health_checks,
        },
        CheckEntry {
            name: "cluster-autoscaler",
            title: "Cluster Autoscaler",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/machine_management/applying-autoscaling.html",
            ],
            run: cluster_autoscaler,
        },
        CheckEntry {
            name: "cluster-proxy",
            title: "Cluster Proxy",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/networking/enable-cluster-wide-proxy.html",
            ],
            run: cluster_proxy,
        },
        CheckEntry {
            name: "default-node-selector",
            title: "Default Node Selector",
            category: Category::ClusterConfig,
            references: &[
                "https://docs.openshift.com/container-platform/latest/nodes/scheduling/nodes-scheduler-node-selectors.html",
            ],
            run: default_node_selector,
        },
    ]
}

/// Infrastructure platform type (`AWS`, `VSphere`, `None`, ...).
pub(crate) fn platform(ctx: &CheckContext) -> Result<String> {
    let infra = ctx.cluster.get(&resource::INFRASTRUCTURE, None, "cluster")?;
    non_empty(&infra, "/status/platformStatus/type")
        .or_else(|| non_empty(&infra, "/status/platform"))
        .map(String::from)
        .ok_or_else(|| AuditError::unexpected("Infrastructure", "platform type is not reported"))
}

fn is_control_plane(node: &Value) -> bool {
    has_label(node, MASTER_LABEL) || has_label(node, CONTROL_PLANE_LABEL)
}

fn nodes(ctx: &CheckContext) -> Result<Vec<Value>> {
    ctx.cluster.list(&resource::NODE, &Selector::all())
}

fn cluster_version(ctx: &CheckContext) -> Result<CheckResult> {
    let cv = ctx.cluster.get(&resource::CLUSTER_VERSION, None, "version")?;
    let current: ReleaseVersion = non_empty(&cv, "/status/desired/version")
        .ok_or_else(|| {
            AuditError::unexpected("ClusterVersion", "status.desired.version is missing")
        })?
        .parse()?;

    let stream_channel = format!("stable-{}", current.stream());
    let latest_patch: ReleaseVersion = match ctx.releases.latest(&stream_channel) {
        Ok(v) => v.parse()?,
        Err(e) => {
            tracing::warn!("release lookup failed: {}", e);
            return Ok(CheckResult::to_evaluate(format!(
                "The cluster is running OpenShift {}. The latest release in {} could not be determined.",
                current, stream_channel
            )));
        }
    };

    if let Some(latest) = ctx
        .releases
        .latest("stable")
        .ok()
        .and_then(|v| v.parse::<ReleaseVersion>().ok())
    {
        if current.minors_behind(&latest) >= 2 {
            return Ok(CheckResult::required(
                format!(
                    "The cluster is running OpenShift {}, {} minor releases behind the latest stable release {}.",
                    current,
                    current.minors_behind(&latest),
                    latest
                ),
                "Plan an upgrade to a supported minor release. Releases more than two minor versions behind leave the support window sooner.",
            ));
        }
    }

    if current < latest_patch {
        Ok(CheckResult::recommended(
            format!(
                "The cluster is running OpenShift {}. The latest release in {} is {}.",
                current, stream_channel, latest_patch
            ),
            format!(
                "Update to {} to pick up the latest bug and security fixes.",
                latest_patch
            ),
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "The cluster is running OpenShift {}, the latest release in {}.",
            current, stream_channel
        )))
    }
}

fn update_channel(ctx: &CheckContext) -> Result<CheckResult> {
    let cv = ctx.cluster.get(&resource::CLUSTER_VERSION, None, "version")?;

    let Some(channel) = non_empty(&cv, "/spec/channel") else {
        return Ok(CheckResult::recommended(
            "No update channel is configured; the cluster will not receive update recommendations.",
            "Set the update channel to the stable or eus channel matching the cluster's minor version.",
        ));
    };

    if channel.starts_with("stable-") || channel.starts_with("eus-") {
        Ok(CheckResult::no_change(format!(
            "The cluster follows the {} channel.",
            channel
        )))
    } else {
        Ok(CheckResult::advisory(
            format!("The cluster follows the {} channel.", channel),
            "Production clusters should follow a stable or eus channel. Fast and candidate channels receive releases before they are broadly validated.",
        ))
    }
}

fn upgrade_history(ctx: &CheckContext) -> Result<CheckResult> {
    let cv = ctx.cluster.get(&resource::CLUSTER_VERSION, None, "version")?;
    let history = array(&cv, "/status/history");

    if history.is_empty() {
        return Ok(CheckResult::no_change("No update history is recorded."));
    }

    let lines: Vec<String> = history
        .iter()
        .map(|entry| {
            format!(
                "{} ({}, completed {})",
                text(entry, "/version").unwrap_or("unknown"),
                text(entry, "/state").unwrap_or("unknown"),
                text(entry, "/completionTime").unwrap_or("-")
            )
        })
        .collect();
    let listing = bullet_list(&lines, ctx.thresholds.max_listed_items);

    if text(&history[0], "/state") == Some("Partial") {
        Ok(CheckResult::recommended(
            format!("The most recent update did not complete:\n\n{}", listing),
            "Investigate the incomplete update before applying further updates.",
        ))
    } else {
        Ok(CheckResult::no_change(format!("Update history:\n\n{}", listing)))
    }
}

fn cluster_operators(ctx: &CheckContext) -> Result<CheckResult> {
    let operators = ctx.cluster.list(&resource::CLUSTER_OPERATOR, &Selector::all())?;

    let unhealthy: Vec<String> = operators
        .iter()
        .filter_map(|op| {
            let mut problems = Vec::new();
            if !condition_true(op, "Available") {
                problems.push("unavailable");
            }
            if condition_true(op, "Degraded") {
                problems.push("degraded");
            }
            (!problems.is_empty()).then(|| format!("{} ({})", name(op), problems.join(", ")))
        })
        .collect();

    if unhealthy.is_empty() {
        Ok(CheckResult::no_change(format!(
            "All {} are available and not degraded.",
            plural(operators.len(), "cluster operator")
        )))
    } else {
        Ok(CheckResult::required(
            format!(
                "The following cluster operators are unhealthy:\n\n{}",
                bullet_list(&unhealthy, ctx.thresholds.max_listed_items)
            ),
            "Resolve the operator conditions before making further changes to the cluster.",
        ))
    }
}

fn infrastructure_provider(ctx: &CheckContext) -> Result<CheckResult> {
    let infra = ctx.cluster.get(&resource::INFRASTRUCTURE, None, "cluster")?;
    let platform = platform(ctx)?;
    let topology = text(&infra, "/status/controlPlaneTopology").unwrap_or("HighlyAvailable");

    Ok(CheckResult::no_change(format!(
        "Platform: {}. Control plane topology: {}.",
        platform, topology
    )))
}

fn vmware_failure_domains(ctx: &CheckContext) -> Result<CheckResult> {
    if platform(ctx)? != "VSphere" {
        return Ok(CheckResult::not_applicable("The cluster is not running on VMware vSphere."));
    }

    let infra = ctx.cluster.get(&resource::INFRASTRUCTURE, None, "cluster")?;
    let domains: Vec<&str> = array(&infra, "/spec/platformSpec/vsphere/failureDomains")
        .iter()
        .filter_map(|d| text(d, "/name"))
        .collect();

    if domains.len() < 2 {
        Ok(CheckResult::recommended(
            format!(
                "{} defined.",
                plural(domains.len(), "vSphere failure domain")
            ),
            "Define failure domains across vCenter clusters or datastores so nodes are spread over independent hosts.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "vSphere failure domains:\n\n{}",
            bullet_list(&domains, ctx.thresholds.max_listed_items)
        )))
    }
}

fn vmware_csi_driver(ctx: &CheckContext) -> Result<CheckResult> {
    if platform(ctx)? != "VSphere" {
        return Ok(CheckResult::not_applicable("The cluster is not running on VMware vSphere."));
    }

    let Some(driver) = ctx
        .cluster
        .find(&resource::CLUSTER_CSI_DRIVER, None, "csi.vsphere.vmware.com")?
    else {
        return Ok(CheckResult::required(
            "The vSphere CSI driver is not installed.",
            "Install the vSphere CSI driver; the in-tree volume plugin is deprecated.",
        ));
    };

    let state = text(&driver, "/spec/managementState").unwrap_or("Managed");
    let degraded: Vec<&str> = array(&driver, "/status/conditions")
        .iter()
        .filter(|c| {
            text(c, "/type").is_some_and(|t| t.ends_with("Degraded"))
                && text(c, "/status") == Some("True")
        })
        .filter_map(|c| text(c, "/type"))
        .collect();

    if state != "Managed" {
        Ok(CheckResult::required(
            format!("The vSphere CSI driver management state is {}.", state),
            "Set the management state to Managed so the driver receives updates.",
        ))
    } else if !degraded.is_empty() {
        Ok(CheckResult::required(
            format!(
                "The vSphere CSI driver reports degraded conditions:\n\n{}",
                bullet_list(&degraded, ctx.thresholds.max_listed_items)
            ),
            "Check vCenter credentials and connectivity from the cluster.",
        ))
    } else {
        Ok(CheckResult::no_change("The vSphere CSI driver is managed and healthy."))
    }
}

fn node_status(ctx: &CheckContext) -> Result<CheckResult> {
    let nodes = nodes(ctx)?;

    let not_ready: Vec<&str> = nodes
        .iter()
        .filter(|n| !condition_true(n, "Ready"))
        .map(|n| name(n))
        .collect();
    let cordoned: Vec<&str> = nodes
        .iter()
        .filter(|n| flag(n, "/spec/unschedulable"))
        .map(|n| name(n))
        .collect();

    if !not_ready.is_empty() {
        Ok(CheckResult::required(
            format!(
                "{} of {} not ready:\n\n{}",
                not_ready.len(),
                plural(nodes.len(), "node"),
                bullet_list(&not_ready, ctx.thresholds.max_listed_items)
            ),
            "Investigate the kubelet and node conditions of the listed nodes.",
        ))
    } else if !cordoned.is_empty() {
        Ok(CheckResult::recommended(
            format!(
                "All nodes are ready, but scheduling is disabled on:\n\n{}",
                bullet_list(&cordoned, ctx.thresholds.max_listed_items)
            ),
            "Uncordon nodes that are no longer under maintenance.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "All {} are ready and schedulable.",
            plural(nodes.len(), "node")
        )))
    }
}

fn control_plane_nodes(ctx: &CheckContext) -> Result<CheckResult> {
    let count = nodes(ctx)?.iter().filter(|n| is_control_plane(n)).count();

    match count {
        3 => Ok(CheckResult::no_change("The cluster has 3 control plane nodes.")),
        n => Ok(CheckResult::required(
            format!("The cluster has {}.", plural(n, "control plane node")),
            "Highly available clusters require exactly three control plane nodes.",
        )),
    }
}

fn control_plane_schedulable(ctx: &CheckContext) -> Result<CheckResult> {
    let scheduler = ctx.cluster.get(&resource::SCHEDULER, None, "cluster")?;
    let schedulable = flag(&scheduler, "/spec/mastersSchedulable");
    let workers = nodes(ctx)?
        .iter()
        .filter(|n| has_label(n, WORKER_LABEL) && !is_control_plane(n))
        .count();

    if !schedulable {
        Ok(CheckResult::no_change(
            "Control plane nodes do not accept user workloads.",
        ))
    } else if workers == 0 {
        Ok(CheckResult::not_applicable(
            "Compact cluster: control plane nodes also act as workers.",
        ))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "Control plane nodes are schedulable although {} exist.",
                plural(workers, "dedicated worker")
            ),
            "Set mastersSchedulable to false so user workloads cannot starve the control plane.",
        ))
    }
}

fn infrastructure_nodes(ctx: &CheckContext) -> Result<CheckResult> {
    let infra: Vec<String> = nodes(ctx)?
        .iter()
        .filter(|n| has_label(n, INFRA_LABEL))
        .map(|n| name(n).to_string())
        .collect();
    let minimum = ctx.thresholds.min_infra_nodes;

    if infra.len() >= minimum {
        Ok(CheckResult::no_change(format!(
            "{}:\n\n{}",
            plural(infra.len(), "infrastructure node"),
            bullet_list(&infra, ctx.thresholds.max_listed_items)
        )))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "{} found; at least {} expected.",
                plural(infra.len(), "infrastructure node"),
                minimum
            ),
            "Run router, registry, monitoring and logging components on dedicated infrastructure nodes.",
        ))
    }
}

fn node_os_consistency(ctx: &CheckContext) -> Result<CheckResult> {
    let nodes = nodes(ctx)?;
    let kubelets: BTreeSet<&str> = nodes
        .iter()
        .filter_map(|n| text(n, "/status/nodeInfo/kubeletVersion"))
        .collect();
    let images: BTreeSet<&str> = nodes
        .iter()
        .filter_map(|n| text(n, "/status/nodeInfo/osImage"))
        .collect();

    if kubelets.len() > 1 || images.len() > 1 {
        let versions: Vec<&str> = kubelets.iter().chain(images.iter()).copied().collect();
        Ok(CheckResult::recommended(
            format!(
                "Nodes run mixed versions:\n\n{}",
                bullet_list(&versions, ctx.thresholds.max_listed_items)
            ),
            "Confirm no machine config pool is paused or stuck so all nodes converge on one release.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "All nodes run {} with kubelet {}.",
            images.iter().next().copied().unwrap_or("an unknown OS"),
            kubelets.iter().next().copied().unwrap_or("unknown")
        )))
    }
}

fn machine_config_pools(ctx: &CheckContext) -> Result<CheckResult> {
    let pools = ctx
        .cluster
        .list(&resource::MACHINE_CONFIG_POOL, &Selector::all())?;

    let degraded: Vec<&str> = pools
        .iter()
        .filter(|p| condition_true(p, "Degraded"))
        .map(|p| name(p))
        .collect();
    let paused: Vec<&str> = pools
        .iter()
        .filter(|p| flag(p, "/spec/paused"))
        .map(|p| name(p))
        .collect();
    let updating: Vec<&str> = pools
        .iter()
        .filter(|p| condition(p, "Updating") == Some("True"))
        .map(|p| name(p))
        .collect();

    if !degraded.is_empty() {
        Ok(CheckResult::required(
            format!("Degraded machine config pools: {}.", degraded.join(", ")),
            "Inspect the machine-config-daemon logs on the affected nodes.",
        ))
    } else if !paused.is_empty() {
        Ok(CheckResult::recommended(
            format!("Paused machine config pools: {}.", paused.join(", ")),
            "Unpause the pools; paused pools block certificate rotation and updates.",
        ))
    } else if !updating.is_empty() {
        Ok(CheckResult::advisory(
            format!("Machine config pools updating: {}.", updating.join(", ")),
            "Re-run the audit once the update completes.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "All {} are up to date.",
            plural(pools.len(), "machine config pool")
        )))
    }
}

fn machine_health_checks(ctx: &CheckContext) -> Result<CheckResult> {
    if platform(ctx)? == "None" {
        return Ok(CheckResult::not_applicable(
            "The cluster was installed without a platform integration; the Machine API is unavailable.",
        ));
    }

    let checks = ctx.cluster.list(
        &resource::MACHINE_HEALTH_CHECK,
        &Selector::namespace("openshift-machine-api"),
    )?;
    let names: Vec<&str> = checks.iter().map(|c| name(c)).collect();

    if names.is_empty() {
        Ok(CheckResult::recommended(
            "No machine health checks are defined.",
            "Define machine health checks so unhealthy worker machines are replaced automatically.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "Machine health checks:\n\n{}",
            bullet_list(&names, ctx.thresholds.max_listed_items)
        )))
    }
}

fn cluster_autoscaler(ctx: &CheckContext) -> Result<CheckResult> {
    match ctx
        .cluster
        .find(&resource::CLUSTER_AUTOSCALER, None, "default")?
    {
        Some(_) => Ok(CheckResult::no_change("A cluster autoscaler is configured.")),
        None => Ok(CheckResult::advisory(
            "No cluster autoscaler is configured.",
            "Consider a cluster autoscaler with machine autoscalers if workload demand varies.",
        )),
    }
}

fn cluster_proxy(ctx: &CheckContext) -> Result<CheckResult> {
    let proxy = ctx.cluster.get(&resource::PROXY, None, "cluster")?;
    let http = non_empty(&proxy, "/spec/httpProxy");
    let https = non_empty(&proxy, "/spec/httpsProxy");

    if http.is_none() && https.is_none() {
        return Ok(CheckResult::no_change("No cluster-wide proxy is configured."));
    }

    Ok(CheckResult::advisory(
        format!(
            "Cluster-wide proxy: HTTP {}, HTTPS {}, no-proxy {}.",
            http.unwrap_or("-"),
            https.unwrap_or("-"),
            non_empty(&proxy, "/spec/noProxy").unwrap_or("-")
        ),
        "Confirm internal services and the machine network are listed in noProxy.",
    ))
}

fn default_node_selector(ctx: &CheckContext) -> Result<CheckResult> {
    let scheduler = ctx.cluster.get(&resource::SCHEDULER, None, "cluster")?;

    match non_empty(&scheduler, "/spec/defaultNodeSelector") {
        Some(selector) => Ok(CheckResult::no_change(format!(
            "Default node selector: {}.",
            selector
        ))),
        None => Ok(CheckResult::advisory(
            "No default node selector is set; user pods may land on infrastructure nodes.",
            "Set a default node selector targeting worker nodes.",
        )),
    }
}
