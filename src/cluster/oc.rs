//! `oc` CLI transport.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{ClusterQuery, ResourceKind, Selector};
use crate::error::{AuditError, Result};
use crate::shell;

/// Queries the cluster by running `oc get ... -o json`.
#[derive(Debug, Clone)]
pub struct OcClient {
    binary: String,
    kubeconfig: PathBuf,
}

impl OcClient {
    /// Create a client that runs `binary` against `kubeconfig`.
    pub fn new(binary: &str, kubeconfig: &Path) -> Self {
        Self {
            binary: binary.to_string(),
            kubeconfig: kubeconfig.to_path_buf(),
        }
    }

    /// Arguments for `oc get` on a single object.
    pub fn get_args(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Vec<String> {
        let mut args = self.base_args(kind);
        if let Some(ns) = namespace {
            args.push("-n".to_string());
            args.push(ns.to_string());
        }
        args.push(name.to_string());
        args.push("-o".to_string());
        args.push("json".to_string());
        args
    }

    /// Arguments for `oc get` on a list.
    pub fn list_args(&self, kind: &ResourceKind, selector: &Selector) -> Vec<String> {
        let mut args = self.base_args(kind);
        match &selector.namespace {
            Some(ns) => {
                args.push("-n".to_string());
                args.push(ns.clone());
            }
            // Ignored by oc for cluster-scoped kinds.
            None => args.push("--all-namespaces".to_string()),
        }
        if let Some(labels) = &selector.labels {
            args.push("-l".to_string());
            args.push(labels.clone());
        }
        args.push("-o".to_string());
        args.push("json".to_string());
        args
    }

    fn base_args(&self, kind: &ResourceKind) -> Vec<String> {
        vec![
            "--kubeconfig".to_string(),
            self.kubeconfig.display().to_string(),
            "get".to_string(),
            kind.qualified_name(),
        ]
    }

    fn run_json(&self, kind: &ResourceKind, name: &str, args: &[String]) -> Result<Value> {
        let result = shell::run(&self.binary, args)?;

        if !result.success {
            return Err(classify_failure(kind, name, &result.stderr));
        }

        serde_json::from_str(&result.stdout).map_err(|e| AuditError::QueryFailed {
            resource: kind.qualified_name(),
            message: format!("invalid JSON from {}: {}", self.binary, e),
        })
    }
}

/// Map `oc` stderr to an error, recognizing missing objects.
pub fn classify_failure(kind: &ResourceKind, name: &str, stderr: &str) -> AuditError {
    let message = stderr.trim();
    if message.contains("(NotFound)") || message.contains("not found") {
        AuditError::NotFound {
            kind: kind.kind.to_string(),
            name: name.to_string(),
        }
    } else {
        AuditError::QueryFailed {
            resource: kind.qualified_name(),
            message: if message.is_empty() {
                "oc exited with an error".to_string()
            } else {
                message.to_string()
            },
        }
    }
}

impl ClusterQuery for OcClient {
    fn transport(&self) -> &'static str {
        "oc"
    }

    fn get(&self, kind: &ResourceKind, namespace: Option<&str>, name: &str) -> Result<Value> {
        let args = self.get_args(kind, namespace, name);
        self.run_json(kind, name, &args)
    }

    fn list(&self, kind: &ResourceKind, selector: &Selector) -> Result<Vec<Value>> {
        let args = self.list_args(kind, selector);
        let list = self.run_json(kind, kind.plural, &args)?;

        match list.get("items") {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(_) => Err(AuditError::unexpected(kind.kind, "items is not an array")),
        }
    }
}
