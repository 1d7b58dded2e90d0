//! End-to-end audit against an in-memory cluster.

use std::fs;
use std::io::Read;

use chrono::NaiveDate;
use ocaudit::checks::{registry, Verdict};
use ocaudit::cli::commands::run::{REPORT_FILE, RESULTS_FILE};
use ocaudit::cli::commands::{run_audit, AuditTarget};
use ocaudit::cluster::{resource, FakeCluster};
use ocaudit::config::AuditSettings;
use ocaudit::package::verify_archive;
use ocaudit::releases::OfflineFeed;
use ocaudit::report::{heading_marker, summary_marker, Substitution};
use ocaudit::runner::{OutcomeStatus, RunOptions, RunSummary};
use ocaudit::ui::MockUI;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn cluster() -> FakeCluster {
    FakeCluster::new()
        .with_object(
            &resource::CLUSTER_VERSION,
            json!({
                "metadata": {"name": "version"},
                "spec": {"channel": "stable-4.14"},
                "status": {"desired": {"version": "4.14.8"}, "history": []}
            }),
        )
        .with_object(
            &resource::API_SERVER,
            json!({
                "metadata": {"name": "cluster"},
                "spec": {"encryption": {"type": "aesgcm"}}
            }),
        )
        .with_object(
            &resource::NETWORK_CONFIG,
            json!({
                "metadata": {"name": "cluster"},
                "status": {"networkType": "OpenShiftSDN"}
            }),
        )
        .with_objects(
            &resource::NODE,
            vec![
                json!({
                    "metadata": {"name": "master-0", "labels": {"node-role.kubernetes.io/master": ""}},
                    "status": {"conditions": [{"type": "Ready", "status": "True"}]}
                }),
                json!({
                    "metadata": {"name": "worker-0", "labels": {"node-role.kubernetes.io/worker": ""}},
                    "status": {"conditions": [{"type": "Ready", "status": "False"}]}
                }),
            ],
        )
        .with_failure(&resource::CLUSTER_OPERATOR, "forbidden")
}

fn target() -> AuditTarget {
    AuditTarget {
        cluster: "prod".to_string(),
        version: "4.14.8".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    }
}

fn settings(temp: &TempDir) -> AuditSettings {
    AuditSettings {
        customer: "Acme".to_string(),
        output_dir: temp.path().join("health-check"),
        archive: Some(temp.path().join("prod.zip")),
        delay_ms: 0,
        ..Default::default()
    }
}

fn verdict(summary: &RunSummary, name: &str) -> Verdict {
    summary
        .outcomes
        .iter()
        .find(|o| o.name == name)
        .map(|o| o.result.verdict)
        .unwrap()
}

#[test]
fn audit_renders_every_check_and_packages_report() {
    let temp = TempDir::new().unwrap();
    let options = RunOptions::new(&[], &["etcd-backup".to_string()], Duration::ZERO).unwrap();
    let mut ui = MockUI::new();

    let output = run_audit(
        &settings(&temp),
        options,
        &cluster(),
        &OfflineFeed,
        &target(),
        &mut ui,
    )
    .unwrap();
    let summary = &output.summary;

    assert_eq!(summary.outcomes.len(), registry().len());
    assert_eq!(verdict(summary, "kubeadmin-user"), Verdict::NoChange);
    assert_eq!(verdict(summary, "etcd-encryption"), Verdict::NoChange);
    assert_eq!(verdict(summary, "network-type"), Verdict::Recommended);
    assert_eq!(verdict(summary, "node-status"), Verdict::Required);

    let operators = summary
        .outcomes
        .iter()
        .find(|o| o.name == "cluster-operators")
        .unwrap();
    assert_eq!(operators.status, OutcomeStatus::Failed);
    assert!(operators.result.observation.contains("forbidden"));

    let backup = summary.outcomes.iter().find(|o| o.name == "etcd-backup").unwrap();
    assert_eq!(backup.status, OutcomeStatus::Skipped);

    let report = fs::read_to_string(&output.report_path).unwrap();
    assert!(report.contains(":customer: Acme"));
    assert!(report.contains(":report-date: 2024-03-01"));
    assert!(report.contains("Check skipped for this run."));
    for entry in registry() {
        let heading = heading_marker(entry.title);
        assert_eq!(
            report.lines().filter(|l| l.starts_with(&heading)).count(),
            1,
            "{}",
            entry.title
        );
    }
    let legend = ocaudit::report::builtin()
        .unwrap()
        .matches("{set:cellbgcolor:")
        .count();
    assert_eq!(
        report.matches("{set:cellbgcolor:").count(),
        legend + registry().len() * 2
    );

    let results: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output.results_path).unwrap()).unwrap();
    assert_eq!(results["outcomes"].as_array().map(Vec::len), Some(registry().len()));

    let archive = output.archive.unwrap();
    assert_eq!(archive.report.entries, vec![REPORT_FILE, RESULTS_FILE]);
    assert_eq!(verify_archive(&archive.report.path, &archive.password).unwrap(), 2);
    assert!(verify_archive(&archive.report.path, "not-the-password").is_err());

    let mut zip = zip::ZipArchive::new(fs::File::open(&archive.report.path).unwrap()).unwrap();
    let mut packed = String::new();
    zip.by_name_decrypt(REPORT_FILE, archive.password.as_bytes())
        .unwrap()
        .read_to_string(&mut packed)
        .unwrap();
    assert_eq!(packed, report);
}

#[test]
fn rendering_twice_appends_twice() {
    let template = ocaudit::report::builtin().unwrap();
    let mut document = ocaudit::report::ReportDocument::from_template(template);
    let result = ocaudit::checks::CheckResult::no_change("All good.");

    for _ in 0..2 {
        for entry in registry() {
            document.apply(&Substitution::new(&entry, &result));
        }
    }

    let green = "{set:cellbgcolor:#00FF00}";
    let legend = template.matches(green).count();
    let entry = &registry()[0];
    assert_eq!(document.count_marker(&summary_marker(entry.title)), 1);
    assert_eq!(
        document.contents().matches(green).count(),
        legend + registry().len() * 4
    );
}
