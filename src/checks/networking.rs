//! Cluster network, ingress and route checks.

use std::collections::HashSet;

use serde_json::Value;

use super::support::{
    array, bullet_list, is_user_namespace, namespace, non_empty, plural, qualified_name,
    selects_infra, text, user_namespaces,
};
use super::{Category, CheckContext, CheckEntry, CheckResult};
use crate::cluster::{resource, Selector};
use crate::error::Result;

const INGRESS_OPERATOR_NAMESPACE: &str = "openshift-ingress-operator";

pub(super) fn entries() -> Vec<CheckEntry> {
    vec![
        CheckEntry {
            name: "network-type",
            title: "Network Type",
            category: Category::Networking,
            references: &[
                "https://docs.openshift.com/container-platform/latest/networking/ovn_kubernetes_network_provider/migrate-from-openshift-sdn.html",
            ],
            run: network_type,
        },
        CheckEntry {
            name: "ingress-placement",
            title: "Ingress Controller Placement",
            category: Category::Networking,
            references: &[
                "https://docs.openshift.com/container-platform/latest/machine_management/creating-infrastructure-machinesets.html#moving-resources-to-infrastructure-machinesets",
            ],
            run: ingress_placement,
        },
        CheckEntry {
            name: "ingress-replicas",
            title: "Ingress Controller Replicas",
            category: Category::Networking,
            references: &[
                "https://docs.openshift.com/container-platform/latest/networking/ingress-operator.html#nw-ingress-controller-configuration_configuring-ingress",
            ],
            run: ingress_replicas,
        },
        CheckEntry {
            name: "ingress-certificate",
            title: "Ingress Controller Certificate",
            category: Category::Networking,
            references: &[
                "https://docs.openshift.com/container-platform/latest/security/certificates/replacing-default-ingress-certificate.html",
            ],
            run: ingress_certificate,
        },
        CheckEntry {
            name: "insecure-routes",
            title: "Insecure Routes",
            category: Category::Networking,
            references: &[
                "https://docs.openshift.com/container-platform/latest/networking/routes/secured-routes.html",
            ],
            run: insecure_routes,
        },
        CheckEntry {
            name: "network-policies",
            title: "Network Policies",
            category: Category::Networking,
            references: &[
                "https://docs.openshift.com/container-platform/latest/networking/network_policy/about-network-policy.html",
            ],
            run: network_policies,
        },
        CheckEntry {
            name: "project-template",
            title: "Project Request Template",
            category: Category::Networking,
            references: &[
                "https://docs.openshift.com/container-platform/latest/applications/projects/configuring-project-creation.html",
            ],
            run: project_template,
        },
    ]
}

fn default_ingress_controller(ctx: &CheckContext) -> Result<Value> {
    ctx.cluster.get(
        &resource::INGRESS_CONTROLLER,
        Some(INGRESS_OPERATOR_NAMESPACE),
        "default",
    )
}

fn network_type(ctx: &CheckContext) -> Result<CheckResult> {
    let network = ctx.cluster.get(&resource::NETWORK_CONFIG, None, "cluster")?;
    let kind = non_empty(&network, "/status/networkType")
        .or_else(|| non_empty(&network, "/spec/networkType"))
        .unwrap_or("unknown");

    match kind {
        "OVNKubernetes" => Ok(CheckResult::no_change(
            "The cluster uses OVN-Kubernetes.",
        )),
        "OpenShiftSDN" => Ok(CheckResult::recommended(
            "The cluster uses OpenShift SDN.",
            "OpenShift SDN is deprecated. Plan the migration to OVN-Kubernetes.",
        )),
        other => Ok(CheckResult::advisory(
            format!("The cluster uses the {} network plugin.", other),
            "Confirm the third-party network plugin is certified for this OpenShift release.",
        )),
    }
}

fn ingress_placement(ctx: &CheckContext) -> Result<CheckResult> {
    let ingress = default_ingress_controller(ctx)?;

    if selects_infra(ingress.pointer("/spec/nodePlacement/nodeSelector/matchLabels")) {
        Ok(CheckResult::no_change(
            "The default ingress controller runs on infrastructure nodes.",
        ))
    } else {
        Ok(CheckResult::recommended(
            "The default ingress controller is not pinned to infrastructure nodes.",
            "Add a node selector and tolerations so router pods run on infrastructure nodes.",
        ))
    }
}

fn ingress_replicas(ctx: &CheckContext) -> Result<CheckResult> {
    let ingress = default_ingress_controller(ctx)?;
    let available = ingress
        .pointer("/status/availableReplicas")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let minimum = ctx.thresholds.min_ingress_replicas;

    if available < minimum {
        Ok(CheckResult::required(
            format!(
                "The default ingress controller has {} available; at least {} expected.",
                plural(available as usize, "replica"),
                minimum
            ),
            "Scale the default ingress controller so routing survives the loss of a node.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "The default ingress controller has {} available.",
            plural(available as usize, "replica")
        )))
    }
}

fn ingress_certificate(ctx: &CheckContext) -> Result<CheckResult> {
    let ingress = default_ingress_controller(ctx)?;

    match non_empty(&ingress, "/spec/defaultCertificate/name") {
        Some(secret) => Ok(CheckResult::no_change(format!(
            "The default ingress controller serves the certificate from secret {}.",
            secret
        ))),
        None => Ok(CheckResult::recommended(
            "The default ingress controller serves the self-signed wildcard certificate.",
            "Replace the default ingress certificate with one issued by a trusted CA.",
        )),
    }
}

fn insecure_routes(ctx: &CheckContext) -> Result<CheckResult> {
    let routes = ctx.cluster.list(&resource::ROUTE, &Selector::all())?;

    let insecure: Vec<String> = routes
        .iter()
        .filter(|r| is_user_namespace(namespace(r)))
        .filter(|r| {
            r.pointer("/spec/tls").map_or(true, Value::is_null)
                || text(r, "/spec/tls/insecureEdgeTerminationPolicy") == Some("Allow")
        })
        .map(|r| {
            format!(
                "{} ({})",
                qualified_name(r),
                text(r, "/spec/host").unwrap_or("no host")
            )
        })
        .collect();

    if insecure.is_empty() {
        Ok(CheckResult::no_change(
            "All application routes use TLS.",
        ))
    } else {
        Ok(CheckResult::advisory(
            format!(
                "{} serve plain HTTP:\n\n{}",
                plural(insecure.len(), "route"),
                bullet_list(&insecure, ctx.thresholds.max_listed_items)
            ),
            "Use edge, passthrough or re-encrypt termination and redirect HTTP to HTTPS.",
        ))
    }
}

fn network_policies(ctx: &CheckContext) -> Result<CheckResult> {
    let projects = user_namespaces(ctx.cluster)?;
    if projects.is_empty() {
        return Ok(CheckResult::not_applicable("No user projects exist."));
    }

    let policies = ctx
        .cluster
        .list(&resource::NETWORK_POLICY, &Selector::all())?;
    let covered: HashSet<&str> = policies.iter().map(|p| namespace(p)).collect();
    let uncovered: Vec<&String> = projects
        .iter()
        .filter(|p| !covered.contains(p.as_str()))
        .collect();

    if uncovered.is_empty() {
        Ok(CheckResult::no_change(format!(
            "All {} have network policies.",
            plural(projects.len(), "user project")
        )))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "{} of {} have no network policy:\n\n{}",
                uncovered.len(),
                plural(projects.len(), "user project"),
                bullet_list(&uncovered, ctx.thresholds.max_listed_items)
            ),
            "Add default network policies through the project request template.",
        ))
    }
}

fn project_template(ctx: &CheckContext) -> Result<CheckResult> {
    let project = ctx.cluster.get(&resource::PROJECT_CONFIG, None, "cluster")?;

    match non_empty(&project, "/spec/projectRequestTemplate/name") {
        Some(template) => Ok(CheckResult::no_change(format!(
            "New projects are created from template {}.",
            template
        ))),
        None => Ok(CheckResult::recommended(
            "No project request template is configured.",
            "Create a project request template with default quotas, limit ranges and network policies.",
        )),
    }
}
