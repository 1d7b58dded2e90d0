//! etcd health and backup checks.

use super::support::{bullet_list, condition_true, name, plural, qualified_name};
use super::{Category, CheckContext, CheckEntry, CheckResult};
use crate::cluster::{resource, Selector};
use crate::error::Result;

pub(super) fn entries() -> Vec<CheckEntry> {
    vec![
        CheckEntry {
            name: "etcd-health",
            title: "ETCD Health",
            category: Category::Operations,
            references: &[
                "https://docs.openshift.com/container-platform/latest/backup_and_restore/control_plane_backup_and_restore/replacing-unhealthy-etcd-member.html",
            ],
            run: etcd_health,
        },
        CheckEntry {
            name: "etcd-backup",
            title: "ETCD Backup",
            category: Category::Operations,
            references: &[
                "https://docs.openshift.com/container-platform/latest/backup_and_restore/control_plane_backup_and_restore/backing-up-etcd.html",
            ],
            run: etcd_backup,
        },
    ]
}

/// Healthy only when the etcd operator is available, not degraded, and every
/// member pod is ready. Anything else is a required change.
fn etcd_health(ctx: &CheckContext) -> Result<CheckResult> {
    let operator = ctx.cluster.get(&resource::CLUSTER_OPERATOR, None, "etcd")?;
    let members = ctx.cluster.list(
        &resource::POD,
        &Selector::namespace("openshift-etcd").with_labels("app=etcd"),
    )?;

    let mut problems = Vec::new();
    if !condition_true(&operator, "Available") {
        problems.push("the etcd operator is not available".to_string());
    }
    if condition_true(&operator, "Degraded") {
        problems.push("the etcd operator is degraded".to_string());
    }
    if members.is_empty() {
        problems.push("no etcd member pods were found".to_string());
    }
    problems.extend(
        members
            .iter()
            .filter(|pod| !condition_true(pod, "Ready"))
            .map(|pod| format!("member pod {} is not ready", name(pod))),
    );

    if problems.is_empty() {
        Ok(CheckResult::no_change(format!(
            "The etcd operator is healthy and all {} are ready.",
            plural(members.len(), "member pod")
        )))
    } else {
        Ok(CheckResult::required(
            format!(
                "etcd is unhealthy:\n\n{}",
                bullet_list(&problems, ctx.thresholds.max_listed_items)
            ),
            "Restore etcd quorum before any other maintenance; follow the unhealthy member replacement procedure.",
        ))
    }
}

fn etcd_backup(ctx: &CheckContext) -> Result<CheckResult> {
    let jobs = ctx.cluster.list(&resource::CRON_JOB, &Selector::all())?;
    let backups: Vec<String> = jobs
        .iter()
        .filter(|job| {
            let job_name = name(job).to_lowercase();
            job_name.contains("etcd") && job_name.contains("backup")
        })
        .map(qualified_name)
        .collect();

    if backups.is_empty() {
        Ok(CheckResult::recommended(
            "No scheduled etcd backup was found.",
            "Schedule regular etcd backups and store them outside the cluster.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "Scheduled etcd backups:\n\n{}",
            bullet_list(&backups, ctx.thresholds.max_listed_items)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{run_check, run_check_err, StaticFeed};
    use crate::checks::Verdict;
    use crate::cluster::FakeCluster;
    use serde_json::{json, Value};

    fn operator(available: bool, degraded: bool) -> Value {
        json!({"metadata": {"name": "etcd"}, "status": {"conditions": [
            {"type": "Available", "status": if available { "True" } else { "False" }},
            {"type": "Degraded", "status": if degraded { "True" } else { "False" }}
        ]}})
    }

    fn member(name: &str, ready: bool) -> Value {
        json!({
            "metadata": {"name": name, "namespace": "openshift-etcd", "labels": {"app": "etcd"}},
            "status": {"conditions": [{"type": "Ready", "status": if ready { "True" } else { "False" }}]}
        })
    }

    fn cluster(operator: Value, members: Vec<Value>) -> FakeCluster {
        FakeCluster::new()
            .with_object(&resource::CLUSTER_OPERATOR, operator)
            .with_objects(&resource::POD, members)
    }

    #[test]
    fn healthy_etcd() {
        let cluster = cluster(
            operator(true, false),
            vec![member("etcd-m0", true), member("etcd-m1", true), member("etcd-m2", true)],
        );
        let result = run_check(etcd_health, &cluster, &StaticFeed::new(&[]));
        assert_eq!(result.verdict, Verdict::NoChange);
        assert!(result.observation.contains("3 member pods"));
    }

    #[test]
    fn degraded_operator_is_required_even_with_ready_members() {
        let cluster = cluster(operator(true, true), vec![member("etcd-m0", true)]);
        assert_eq!(
            run_check(etcd_health, &cluster, &StaticFeed::new(&[])).verdict,
            Verdict::Required
        );
    }

    #[test]
    fn unready_member_is_required_even_with_healthy_operator() {
        let members = vec![member("etcd-m0", true), member("etcd-m1", false)];
        let cluster = cluster(operator(true, false), members);
        let result = run_check(etcd_health, &cluster, &StaticFeed::new(&[]));
        assert_eq!(result.verdict, Verdict::Required);
        assert!(result.observation.contains("etcd-m1"));
    }

    #[test]
    fn missing_operator_is_an_error() {
        assert!(run_check_err(etcd_health, &FakeCluster::new()).is_not_found());
    }

    #[test]
    fn backup_cronjob_detected() {
        let feed = StaticFeed::new(&[]);
        assert_eq!(
            run_check(etcd_backup, &FakeCluster::new(), &feed).verdict,
            Verdict::Recommended
        );

        let cluster = FakeCluster::new().with_object(
            &resource::CRON_JOB,
            json!({"metadata": {"name": "etcd-backup", "namespace": "ops"}}),
        );
        let result = run_check(etcd_backup, &cluster, &feed);
        assert_eq!(result.verdict, Verdict::NoChange);
        assert!(result.observation.contains("ops/etcd-backup"));
    }
}
