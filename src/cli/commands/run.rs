//! Run command implementation.
//!
//! The `ocaudit run` command audits the cluster, writes the report and
//! packages it. It is also what a bare `ocaudit` invocation does.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::checks::{registry, CheckContext, Verdict};
use crate::cli::args::{Cli, RunArgs};
use crate::cluster::{self, resolve_path, ClusterQuery, KubeconfigSummary};
use crate::config::{self, AuditSettings};
use crate::error::Result;
use crate::package::{archive_directory, digest, generate_password, verify_archive, ArchiveReport};
use crate::releases::{HttpReleaseFeed, OfflineFeed, ReleaseFeed};
use crate::report::{load_template, ReportDocument};
use crate::runner::{AuditRunner, OutcomeStatus, RunOptions, RunSummary};
use crate::ui::{format_duration, OutputMode, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Report file name inside the output directory.
pub const REPORT_FILE: &str = "health-check.adoc";

/// Machine-readable results inside the output directory.
pub const RESULTS_FILE: &str = "results.json";

/// Identity of the audited cluster, printed on the report.
#[derive(Debug, Clone)]
pub struct AuditTarget {
    pub cluster: String,
    pub version: String,
    pub date: NaiveDate,
}

impl AuditTarget {
    /// Default archive file name, e.g. `prod-health-check-20240131.zip`.
    pub fn archive_name(&self) -> String {
        format!("{}-health-check-{}.zip", self.cluster, self.date.format("%Y%m%d"))
    }
}

/// A written and verified archive.
#[derive(Debug, Clone)]
pub struct PackagedArchive {
    pub report: ArchiveReport,
    pub password: String,
    pub sha256: String,
}

/// Everything an audit produced.
#[derive(Debug)]
pub struct AuditOutput {
    pub report_path: PathBuf,
    pub results_path: PathBuf,
    pub summary: RunSummary,
    pub archive: Option<PackagedArchive>,
}

/// Render all checks against `cluster` and write the report, results and
/// archive described by `settings`.
pub fn run_audit(
    settings: &AuditSettings,
    options: RunOptions,
    cluster: &dyn ClusterQuery,
    releases: &dyn ReleaseFeed,
    target: &AuditTarget,
    ui: &mut dyn UserInterface,
) -> Result<AuditOutput> {
    let template = load_template(settings.template.as_deref())?;
    let mut document = ReportDocument::from_template(&template);

    let date = target.date.format("%Y-%m-%d").to_string();
    let tool = format!("ocaudit {}", env!("CARGO_PKG_VERSION"));
    for (name, value) in [
        ("customer", settings.customer.as_str()),
        ("cluster", target.cluster.as_str()),
        ("cluster-version", target.version.as_str()),
        ("report-date", date.as_str()),
        ("audit-tool", tool.as_str()),
    ] {
        if !document.set_attribute(name, value) {
            debug!("template has no :{}: attribute", name);
        }
    }

    let ctx = CheckContext {
        cluster,
        releases,
        thresholds: &settings.thresholds,
    };
    let entries = registry();
    let summary = AuditRunner::new(&entries, options).run(&ctx, &mut document, ui);

    fs::create_dir_all(&settings.output_dir)?;
    let report_path = settings.output_dir.join(REPORT_FILE);
    let results_path = settings.output_dir.join(RESULTS_FILE);
    document.write(&report_path)?;
    summary.write_json(&results_path)?;
    info!("report written to {}", report_path.display());

    let archive = if settings.create_archive {
        let dest = settings
            .archive
            .clone()
            .unwrap_or_else(|| PathBuf::from(target.archive_name()));
        Some(package(&settings.output_dir, &dest)?)
    } else {
        None
    };

    Ok(AuditOutput {
        report_path,
        results_path,
        summary,
        archive,
    })
}

fn package(source: &Path, dest: &Path) -> Result<PackagedArchive> {
    let password = generate_password()?;
    let report = archive_directory(source, dest, &password)?;
    let verified = verify_archive(dest, &password)?;
    debug!("verified {} archive entries", verified);
    let sha256 = digest(dest)?;

    Ok(PackagedArchive {
        report,
        password,
        sha256,
    })
}

/// The run command implementation.
pub struct RunCommand {
    working_dir: PathBuf,
    config_path: Option<PathBuf>,
    kubeconfig: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(working_dir: &Path, cli: &Cli, args: RunArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config_path: cli.config.clone(),
            kubeconfig: cli.kubeconfig.clone(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Resolve settings: config file values, then command-line overrides.
    pub fn settings(&self) -> Result<AuditSettings> {
        let file = config::load(self.config_path.as_deref(), &self.working_dir)?;
        let mut settings = AuditSettings::from_config(file);
        let args = &self.args;

        if let Some(customer) = &args.customer {
            settings.customer = customer.clone();
        }
        if let Some(dir) = &args.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(template) = &args.template {
            settings.template = Some(template.clone());
        }
        if let Some(transport) = args.transport {
            settings.transport = transport;
        }
        if let Some(delay) = args.delay_ms {
            settings.delay_ms = delay;
        }
        if !args.skip.is_empty() {
            settings.skip.extend(args.skip.iter().cloned());
        }
        settings.only = args.only.clone();
        settings.archive = args.archive.clone();
        settings.create_archive = !args.no_archive;

        settings.output_dir = self.working_dir.join(&settings.output_dir);
        settings.archive = settings.archive.map(|a| self.working_dir.join(a));
        Ok(settings)
    }

    fn target(
        &self,
        kubeconfig: &KubeconfigSummary,
        cluster: &dyn ClusterQuery,
    ) -> Result<AuditTarget> {
        let version = cluster::preflight(cluster)?
            .pointer("/status/desired/version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(AuditTarget {
            cluster: kubeconfig.cluster_name(),
            version,
            date: Local::now().date_naive(),
        })
    }

    fn show_results(&self, output: &AuditOutput, ui: &mut dyn UserInterface) {
        let summary = &output.summary;

        match ui.output_mode() {
            OutputMode::Verbose => {
                for outcome in &summary.outcomes {
                    ui.show_verdict(outcome.title, outcome.result.verdict);
                }
            }
            OutputMode::Normal => {
                for outcome in summary.needing_action() {
                    ui.show_verdict(outcome.title, outcome.result.verdict);
                }
            }
            OutputMode::Quiet => {}
        }

        let counts: Vec<String> = summary
            .counts()
            .iter()
            .map(|(verdict, n)| format!("{} {}", n, verdict))
            .collect();
        ui.message(&format!(
            "\n{} in {}",
            counts.join(", "),
            format_duration(summary.duration)
        ));

        let failed = summary.count_status(OutcomeStatus::Failed);
        if failed > 0 {
            ui.warning(&format!(
                "{} check(s) could not be completed; see the report for details",
                failed
            ));
        }
        if summary.count(Verdict::Required) > 0 {
            ui.warning(&format!(
                "{} finding(s) require changes",
                summary.count(Verdict::Required)
            ));
        }

        ui.success(&format!("Report written to {}", output.report_path.display()));

        if let Some(archive) = &output.archive {
            ui.success(&format!("Archive written to {}", archive.report.path.display()));
            ui.show_field("Password", &archive.password);
            ui.show_field("SHA-256", &archive.sha256);
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.settings()?;
        let options = RunOptions::new(
            &settings.only,
            &settings.skip,
            Duration::from_millis(settings.delay_ms),
        )?;

        let kubeconfig_path = resolve_path(self.kubeconfig.as_deref())?;
        let kubeconfig = KubeconfigSummary::load(&kubeconfig_path)?;

        ui.show_header("OpenShift Health Check");
        ui.show_field("Cluster", &kubeconfig.cluster_name());
        ui.show_field("Server", &kubeconfig.server);
        if ui.output_mode() == OutputMode::Verbose {
            ui.show_field("Context", &kubeconfig.context);
            ui.show_field("Config", &kubeconfig_path.display().to_string());
        }

        let cluster = cluster::connect(settings.transport, &kubeconfig_path, &settings.oc_binary)?;
        let target = self.target(&kubeconfig, cluster.as_ref())?;
        ui.show_field("Version", &target.version);
        ui.show_field("Transport", cluster.transport());

        let releases: Box<dyn ReleaseFeed> = if self.args.offline {
            Box::new(OfflineFeed)
        } else {
            Box::new(HttpReleaseFeed::new(&settings.release_mirror)?)
        };

        let output = run_audit(
            &settings,
            options,
            cluster.as_ref(),
            releases.as_ref(),
            &target,
            ui,
        )?;
        self.show_results(&output, ui);

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{resource, FakeCluster};
    use crate::error::AuditError;
    use crate::ui::MockUI;
    use clap::Parser;
    use serde_json::json;
    use tempfile::TempDir;

    fn command(dir: &Path, argv: &[&str]) -> RunCommand {
        let mut full = vec!["ocaudit"];
        full.extend_from_slice(argv);
        let cli = Cli::parse_from(full);
        let args = match &cli.command {
            Some(crate::cli::Commands::Run(args)) => args.clone(),
            _ => RunArgs::default(),
        };
        RunCommand::new(dir, &cli, args)
    }

    fn target() -> AuditTarget {
        AuditTarget {
            cluster: "prod".to_string(),
            version: "4.14.8".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        }
    }

    fn cluster() -> FakeCluster {
        FakeCluster::new().with_object(
            &resource::CLUSTER_VERSION,
            json!({
                "metadata": {"name": "version"},
                "spec": {"channel": "stable-4.14"},
                "status": {"desired": {"version": "4.14.8"}}
            }),
        )
    }

    #[test]
    fn archive_name_uses_cluster_and_date() {
        assert_eq!(target().archive_name(), "prod-health-check-20240131.zip");
    }

    #[test]
    fn flags_override_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("ocaudit.yml"),
            "customer: From File\ndelay_ms: 500\nskip: [etcd-backup]\n",
        )
        .unwrap();

        let settings = command(
            temp.path(),
            &["run", "--customer", "Acme", "--skip", "alert-receivers", "--no-archive"],
        )
        .settings()
        .unwrap();

        assert_eq!(settings.customer, "Acme");
        assert_eq!(settings.delay_ms, 500);
        assert_eq!(settings.skip, vec!["etcd-backup", "alert-receivers"]);
        assert!(!settings.create_archive);
        assert_eq!(settings.output_dir, temp.path().join("health-check"));
    }

    #[test]
    fn unknown_check_fails_before_connecting() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let err = command(temp.path(), &["run", "--only", "bogus"])
            .execute(&mut ui)
            .unwrap_err();
        assert!(matches!(err, AuditError::ConfigValidationError { .. }));
    }

    #[test]
    fn audit_writes_report_results_and_archive() {
        let temp = TempDir::new().unwrap();
        let settings = AuditSettings {
            customer: "Acme".to_string(),
            output_dir: temp.path().join("out"),
            archive: Some(temp.path().join("report.zip")),
            delay_ms: 0,
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let output = run_audit(
            &settings,
            RunOptions::default(),
            &cluster(),
            &OfflineFeed,
            &target(),
            &mut ui,
        )
        .unwrap();

        let report = fs::read_to_string(&output.report_path).unwrap();
        assert!(report.contains(":customer: Acme"));
        assert!(report.contains(":cluster-version: 4.14.8"));
        assert!(output.results_path.is_file());
        assert_eq!(output.summary.outcomes.len(), registry().len());

        let archive = output.archive.unwrap();
        assert_eq!(archive.password.len(), 32);
        assert_eq!(archive.report.entries, vec![REPORT_FILE, RESULTS_FILE]);
        assert_eq!(archive.sha256.len(), 64);
    }

    #[test]
    fn verbose_results_list_every_verdict() {
        let temp = TempDir::new().unwrap();
        let settings = AuditSettings {
            output_dir: temp.path().join("out"),
            create_archive: false,
            delay_ms: 0,
            ..Default::default()
        };
        let output = run_audit(
            &settings,
            RunOptions::default(),
            &cluster(),
            &OfflineFeed,
            &target(),
            &mut MockUI::new(),
        )
        .unwrap();

        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        command(temp.path(), &["run"]).show_results(&output, &mut ui);

        assert_eq!(ui.verdicts().len(), registry().len());
        assert_eq!(ui.verdicts()[0].0, "Cluster Version");
        assert!(ui.successes().iter().any(|s| s.contains(REPORT_FILE)));
        assert!(ui.field("Password").is_none());
    }

    #[test]
    fn normal_results_list_only_findings() {
        let temp = TempDir::new().unwrap();
        let settings = AuditSettings {
            output_dir: temp.path().join("out"),
            create_archive: false,
            delay_ms: 0,
            ..Default::default()
        };
        let output = run_audit(
            &settings,
            RunOptions::default(),
            &cluster(),
            &OfflineFeed,
            &target(),
            &mut MockUI::new(),
        )
        .unwrap();

        let mut ui = MockUI::new();
        command(temp.path(), &["run"]).show_results(&output, &mut ui);

        let expected = output.summary.needing_action().count();
        assert_eq!(ui.verdicts().len(), expected);
        assert!(ui.verdicts().iter().all(|(_, v)| v.needs_action()));

        let mut quiet = MockUI::with_mode(OutputMode::Quiet);
        command(temp.path(), &["run"]).show_results(&output, &mut quiet);
        assert!(quiet.verdicts().is_empty());
    }

    #[test]
    fn audit_without_archive() {
        let temp = TempDir::new().unwrap();
        let settings = AuditSettings {
            output_dir: temp.path().join("out"),
            create_archive: false,
            delay_ms: 0,
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let output = run_audit(
            &settings,
            RunOptions::default(),
            &cluster(),
            &OfflineFeed,
            &target(),
            &mut ui,
        )
        .unwrap();

        assert!(output.archive.is_none());
        assert!(output.report_path.is_file());
    }
}
