//! Kubeconfig discovery and inspection.
//!
//! Both transports authenticate through the same kubeconfig file. This module
//! only resolves which file to use and reads enough of it to name the target
//! cluster; credential handling is left to `oc` and kube-rs.

use std::env;
use std::ffi::OsStr;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use kube::config::Kubeconfig;

use crate::error::{AuditError, Result};

/// Resolve the kubeconfig path.
///
/// Order: explicit path, first existing entry of `KUBECONFIG`, then
/// `~/.kube/config`. The returned path is guaranteed to exist.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let default = dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .unwrap_or_else(|| PathBuf::from(".kube/config"));
    resolve_from(explicit, env::var_os("KUBECONFIG").as_deref(), default)
}

fn resolve_from(
    explicit: Option<&Path>,
    search: Option<&OsStr>,
    default: PathBuf,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf());
    }

    if let Some(value) = search {
        let candidates: Vec<PathBuf> = env::split_paths(value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        if let Some(found) = candidates.iter().find(|p| p.is_file()) {
            return Ok(found.clone());
        }
        if let Some(first) = candidates.into_iter().next() {
            return Err(AuditError::KubeconfigNotFound { path: first });
        }
    }

    existing(default)
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(AuditError::KubeconfigNotFound { path })
    }
}

/// What the current kubeconfig context points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeconfigSummary {
    /// Path the summary was read from.
    pub path: PathBuf,
    /// Name of the current context.
    pub context: String,
    /// User entry referenced by the context.
    pub user: Option<String>,
    /// API server URL.
    pub server: String,
}

impl KubeconfigSummary {
    /// Parse the kubeconfig at `path` and resolve its current context.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Kubeconfig::read_from(path).map_err(|e| parse_error(path, e))?;
        Self::from_config(path, config)
    }

    #[cfg(test)]
    fn parse(path: &Path, content: &str) -> Result<Self> {
        let config = Kubeconfig::from_yaml(content).map_err(|e| parse_error(path, e))?;
        Self::from_config(path, config)
    }

    fn from_config(path: &Path, config: Kubeconfig) -> Result<Self> {
        let invalid = |message: String| parse_error(path, message);

        let context_name = config
            .current_context
            .filter(|c| !c.is_empty())
            .ok_or_else(|| invalid("no current-context set".to_string()))?;

        let context = config
            .contexts
            .into_iter()
            .find(|c| c.name == context_name)
            .and_then(|c| c.context)
            .ok_or_else(|| invalid(format!("context '{}' is not defined", context_name)))?;

        let server = config
            .clusters
            .into_iter()
            .find(|c| c.name == context.cluster)
            .and_then(|c| c.cluster)
            .and_then(|c| c.server)
            .ok_or_else(|| invalid(format!("cluster '{}' has no server", context.cluster)))?;

        Ok(Self {
            path: path.to_path_buf(),
            context: context_name,
            user: Some(context.user).filter(|u| !u.is_empty()),
            server,
        })
    }

    /// Short cluster name derived from the API server host.
    ///
    /// OpenShift API hosts follow `api.<cluster>.<base-domain>`; anything else
    /// falls back to the first host label. IP literals name no cluster.
    pub fn cluster_name(&self) -> String {
        let authority = self
            .server
            .split("://")
            .last()
            .unwrap_or(&self.server)
            .split('/')
            .next()
            .unwrap_or_default();

        if authority.starts_with('[') {
            return FALLBACK_NAME.to_string();
        }
        let host = authority.split(':').next().unwrap_or_default();
        if host.parse::<IpAddr>().is_ok() {
            return FALLBACK_NAME.to_string();
        }

        let mut labels = host.split('.');
        let name = match labels.next() {
            Some("api") | Some("api-int") => labels.next(),
            other => other,
        };

        match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => FALLBACK_NAME.to_string(),
        }
    }
}

const FALLBACK_NAME: &str = "cluster";

fn parse_error(path: &Path, message: impl ToString) -> AuditError {
    AuditError::KubeconfigParseError {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
apiVersion: v1
kind: Config
current-context: admin
contexts:
  - name: admin
    context:
      cluster: prod
      user: admin
clusters:
  - name: prod
    cluster:
      server: https://api.prod.example.com:6443
users:
  - name: admin
    user:
      token: sha256~abc
"#;

    #[test]
    fn parses_current_context() {
        let summary = KubeconfigSummary::parse(Path::new("config"), SAMPLE).unwrap();
        assert_eq!(summary.context, "admin");
        assert_eq!(summary.user.as_deref(), Some("admin"));
        assert_eq!(summary.server, "https://api.prod.example.com:6443");
        assert_eq!(summary.cluster_name(), "prod");
    }

    #[test]
    fn missing_current_context_is_error() {
        let content = "apiVersion: v1\nkind: Config\nclusters: []\ncontexts: []\n";
        let err = KubeconfigSummary::parse(Path::new("config"), content).unwrap_err();
        assert!(err.to_string().contains("no current-context"));
    }

    #[test]
    fn undefined_context_is_error() {
        let content = "current-context: ghost\ncontexts: []\nclusters: []\n";
        let err = KubeconfigSummary::parse(Path::new("config"), content).unwrap_err();
        assert!(err.to_string().contains("'ghost'"));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let err = KubeconfigSummary::parse(Path::new("config"), "::: not yaml [").unwrap_err();
        assert!(matches!(err, AuditError::KubeconfigParseError { .. }));
    }

    #[test]
    fn cluster_name_without_api_prefix() {
        let summary = KubeconfigSummary {
            path: PathBuf::from("config"),
            context: "c".into(),
            user: None,
            server: "https://kube.internal:443".into(),
        };
        assert_eq!(summary.cluster_name(), "kube");
    }

    #[test]
    fn cluster_name_for_ip_servers() {
        let mut summary = KubeconfigSummary::parse(Path::new("config"), SAMPLE).unwrap();
        summary.server = "https://[fd00::10]:6443".into();
        assert_eq!(summary.cluster_name(), "cluster");

        summary.server = "https://10.0.0.5:6443".into();
        assert_eq!(summary.cluster_name(), "cluster");
    }

    #[test]
    fn context_without_server_is_error() {
        let content = r#"
current-context: a
contexts:
  - name: a
    context:
      cluster: c
      user: u
clusters:
  - name: c
    cluster: {}
"#;
        let err = KubeconfigSummary::parse(Path::new("config"), content).unwrap_err();
        assert!(err.to_string().contains("'c' has no server"));
    }

    #[test]
    fn kubeconfig_list_uses_first_existing_entry() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let present = temp.path().join("present");
        let later = temp.path().join("later");
        fs::write(&present, SAMPLE).unwrap();
        fs::write(&later, SAMPLE).unwrap();
        let search = env::join_paths([&missing, &present, &later]).unwrap();

        let default = temp.path().join("default");
        let found = resolve_from(None, Some(search.as_os_str()), default).unwrap();
        assert_eq!(found, present);
    }

    #[test]
    fn kubeconfig_list_without_existing_entry_reports_first() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        let default = temp.path().join("default");
        fs::write(&default, SAMPLE).unwrap();
        let search = env::join_paths([&first, &second]).unwrap();

        match resolve_from(None, Some(search.as_os_str()), default) {
            Err(AuditError::KubeconfigNotFound { path }) => assert_eq!(path, first),
            other => panic!("expected missing kubeconfig, got {:?}", other),
        }
    }

    #[test]
    fn empty_kubeconfig_list_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let default = temp.path().join("default");
        fs::write(&default, SAMPLE).unwrap();

        let found = resolve_from(None, Some(OsStr::new("")), default.clone()).unwrap();
        assert_eq!(found, default);
    }

    #[test]
    fn explicit_path_wins_over_kubeconfig_list() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("explicit");
        let listed = temp.path().join("listed");
        fs::write(&explicit, SAMPLE).unwrap();
        fs::write(&listed, SAMPLE).unwrap();

        let search = Some(listed.as_os_str());
        let found = resolve_from(Some(explicit.as_path()), search, listed.clone()).unwrap();
        assert_eq!(found, explicit);
    }

    #[test]
    fn resolve_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kubeconfig");
        fs::write(&path, SAMPLE).unwrap();

        assert_eq!(resolve_path(Some(&path)).unwrap(), path);
    }

    #[test]
    fn resolve_missing_explicit_path_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope");

        let err = resolve_path(Some(&path)).unwrap_err();
        assert!(matches!(err, AuditError::KubeconfigNotFound { .. }));
    }

    #[test]
    fn load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kubeconfig");
        fs::write(&path, SAMPLE).unwrap();

        let summary = KubeconfigSummary::load(&path).unwrap();
        assert_eq!(summary.path, path);
    }
}
