//! Application project and operator lifecycle checks.

use std::collections::{BTreeSet, HashSet};

use serde_json::Value;

use super::support::{
    array, bullet_list, has_label, is_user_namespace, name, namespace, plural, qualified_name,
    text, user_namespaces,
};
use super::{Category, CheckContext, CheckEntry, CheckResult};
use crate::cluster::{resource, ResourceKind, Selector};
use crate::error::Result;

/// Container waiting reasons that indicate a broken workload.
const FAILING_REASONS: &[&str] = &[
    "CrashLoopBackOff",
    "ImagePullBackOff",
    "ErrImagePull",
    "CreateContainerConfigError",
];

pub(super) fn entries() -> Vec<CheckEntry> {
    vec![
        CheckEntry {
            name: "resource-quotas",
            title: "Resource Quotas",
            category: Category::Applications,
            references: &[
                "https://docs.openshift.com/container-platform/latest/applications/quotas/quotas-setting-per-project.html",
            ],
            run: resource_quotas,
        },
        CheckEntry {
            name: "limit-ranges",
            title: "Limit Ranges",
            category: Category::Applications,
            references: &[
                "https://docs.openshift.com/container-platform/latest/nodes/clusters/nodes-cluster-limit-ranges.html",
            ],
            run: limit_ranges,
        },
        CheckEntry {
            name: "unhealthy-pods",
            title: "Unhealthy Pods",
            category: Category::Applications,
            references: &[
                "https://docs.openshift.com/container-platform/latest/support/troubleshooting/investigating-pod-issues.html",
            ],
            run: unhealthy_pods,
        },
        CheckEntry {
            name: "operator-health",
            title: "Operator Health",
            category: Category::Applications,
            references: &[
                "https://docs.openshift.com/container-platform/latest/operators/admin/olm-status.html",
            ],
            run: operator_health,
        },
        CheckEntry {
            name: "operator-approval",
            title: "Operator Update Approval",
            category: Category::Applications,
            references: &[
                "https://docs.openshift.com/container-platform/latest/operators/admin/olm-upgrading-operators.html",
            ],
            run: operator_approval,
        },
    ]
}

/// User projects that contain no object of `kind`.
///
/// `None` when the cluster has no user projects at all.
fn projects_without(
    ctx: &CheckContext,
    kind: &ResourceKind,
) -> Result<Option<(usize, Vec<String>)>> {
    let projects = user_namespaces(ctx.cluster)?;
    if projects.is_empty() {
        return Ok(None);
    }

    let objects = ctx.cluster.list(kind, &Selector::all())?;
    let covered: HashSet<&str> = objects.iter().map(|o| namespace(o)).collect();
    let missing = projects
        .iter()
        .filter(|p| !covered.contains(p.as_str()))
        .cloned()
        .collect();

    Ok(Some((projects.len(), missing)))
}

fn per_project_coverage(
    ctx: &CheckContext,
    kind: &ResourceKind,
    noun: &str,
    recommendation: &str,
) -> Result<CheckResult> {
    let Some((total, missing)) = projects_without(ctx, kind)? else {
        return Ok(CheckResult::not_applicable("No user projects exist."));
    };

    if missing.is_empty() {
        Ok(CheckResult::no_change(format!(
            "All {} define {}.",
            plural(total, "user project"),
            noun
        )))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "{} of {} define no {}:\n\n{}",
                missing.len(),
                plural(total, "user project"),
                noun,
                bullet_list(&missing, ctx.thresholds.max_listed_items)
            ),
            recommendation,
        ))
    }
}

fn resource_quotas(ctx: &CheckContext) -> Result<CheckResult> {
    per_project_coverage(
        ctx,
        &resource::RESOURCE_QUOTA,
        "resource quotas",
        "Apply resource quotas to every project, ideally through the project request template.",
    )
}

fn limit_ranges(ctx: &CheckContext) -> Result<CheckResult> {
    per_project_coverage(
        ctx,
        &resource::LIMIT_RANGE,
        "limit ranges",
        "Apply limit ranges so containers without requests receive sensible defaults.",
    )
}

/// Why a pod is unhealthy, if it is.
fn pod_problem(pod: &Value) -> Option<String> {
    if text(pod, "/status/phase") == Some("Failed") {
        return Some("Failed".to_string());
    }

    array(pod, "/status/containerStatuses")
        .iter()
        .filter_map(|c| text(c, "/state/waiting/reason"))
        .find(|reason| FAILING_REASONS.contains(reason))
        .map(String::from)
}

fn unhealthy_pods(ctx: &CheckContext) -> Result<CheckResult> {
    let pods = ctx.cluster.list(&resource::POD, &Selector::all())?;

    let unhealthy: Vec<String> = pods
        .iter()
        .filter(|pod| is_user_namespace(namespace(pod)))
        .filter_map(|pod| pod_problem(pod).map(|why| format!("{} ({})", qualified_name(pod), why)))
        .collect();

    if unhealthy.is_empty() {
        Ok(CheckResult::no_change(
            "No failed or crash-looping pods in user projects.",
        ))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "{} in user projects are failing:\n\n{}",
                plural(unhealthy.len(), "pod"),
                bullet_list(&unhealthy, ctx.thresholds.max_listed_items)
            ),
            "Work with the application owners to fix or remove failing workloads.",
        ))
    }
}

fn operator_health(ctx: &CheckContext) -> Result<CheckResult> {
    let csvs = ctx
        .cluster
        .list(&resource::CLUSTER_SERVICE_VERSION, &Selector::all())?;

    // OLM copies global operators' CSVs into every namespace.
    let installed: Vec<&Value> = csvs
        .iter()
        .filter(|csv| !has_label(csv, "olm.copiedFrom"))
        .collect();
    let failing: BTreeSet<String> = installed
        .iter()
        .filter_map(|csv| match text(csv, "/status/phase") {
            Some("Succeeded") => None,
            phase => Some(format!("{} ({})", name(csv), phase.unwrap_or("Unknown"))),
        })
        .collect();

    if installed.is_empty() {
        Ok(CheckResult::not_applicable(
            "No operators are installed through OLM.",
        ))
    } else if failing.is_empty() {
        Ok(CheckResult::no_change(format!(
            "All {} succeeded.",
            plural(installed.len(), "operator installation")
        )))
    } else {
        let failing: Vec<String> = failing.into_iter().collect();
        Ok(CheckResult::required(
            format!(
                "Operators not in the Succeeded phase:\n\n{}",
                bullet_list(&failing, ctx.thresholds.max_listed_items)
            ),
            "Inspect the install plans and operator pods of the listed operators.",
        ))
    }
}

fn operator_approval(ctx: &CheckContext) -> Result<CheckResult> {
    let subscriptions = ctx.cluster.list(&resource::SUBSCRIPTION, &Selector::all())?;
    if subscriptions.is_empty() {
        return Ok(CheckResult::not_applicable(
            "No operators are installed through OLM.",
        ));
    }

    let automatic: Vec<String> = subscriptions
        .iter()
        .filter(|s| text(s, "/spec/installPlanApproval").unwrap_or("Automatic") == "Automatic")
        .map(qualified_name)
        .collect();

    if automatic.is_empty() {
        Ok(CheckResult::no_change(format!(
            "All {} require manual approval.",
            plural(subscriptions.len(), "operator subscription")
        )))
    } else {
        Ok(CheckResult::advisory(
            format!(
                "{} update automatically:\n\n{}",
                plural(automatic.len(), "operator subscription"),
                bullet_list(&automatic, ctx.thresholds.max_listed_items)
            ),
            "Consider manual approval for operators whose updates need a change window.",
        ))
    }
}
