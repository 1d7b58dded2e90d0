//! Read-only access to the audited cluster.
//!
//! Checks never talk to a transport directly. They go through the
//! [`ClusterQuery`] capability, which returns raw JSON objects regardless of
//! whether the data came from an `oc` subprocess or the REST API:
//!
//! - [`OcClient`] - shells out to `oc get ... -o json`
//! - [`KubeApiClient`] - dynamic kube-rs client
//! - [`FakeCluster`] - in-memory fixtures for tests
//!
//! # Example
//!
//! ```
//! use ocaudit::cluster::{resource, ClusterQuery, FakeCluster, Selector};
//! use serde_json::json;
//!
//! let cluster = FakeCluster::new().with_object(
//!     &resource::NODE,
//!     json!({"metadata": {"name": "worker-0"}}),
//! );
//! let nodes = cluster.list(&resource::NODE, &Selector::all()).unwrap();
//! assert_eq!(nodes.len(), 1);
//! ```

pub mod api;
pub mod fake;
pub mod kubeconfig;
pub mod oc;
pub mod resource;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuditError, Result};

pub use api::KubeApiClient;
pub use fake::FakeCluster;
pub use kubeconfig::{resolve_path, KubeconfigSummary};
pub use oc::OcClient;
pub use resource::{ResourceKind, Selector};

/// Read-only query capability against a cluster.
pub trait ClusterQuery {
    /// Short transport name for logs and the report.
    fn transport(&self) -> &'static str;

    /// Fetch a single object. Missing objects yield [`AuditError::NotFound`].
    fn get(&self, kind: &ResourceKind, namespace: Option<&str>, name: &str) -> Result<Value>;

    /// List objects matching the selector.
    fn list(&self, kind: &ResourceKind, selector: &Selector) -> Result<Vec<Value>>;

    /// Like [`get`](Self::get), but a missing object is `Ok(None)`.
    fn find(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<Value>> {
        match self.get(kind, namespace, name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// How ocaudit reaches the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// `oc` CLI subprocesses.
    Oc,
    /// Kubernetes REST API via kube-rs.
    #[default]
    Api,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oc" | "cli" => Ok(Self::Oc),
            "api" | "rest" => Ok(Self::Api),
            _ => Err(format!("unknown transport: {} (expected 'oc' or 'api')", s)),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oc => f.write_str("oc"),
            Self::Api => f.write_str("api"),
        }
    }
}

/// Build a client for the chosen transport.
pub fn connect(
    transport: Transport,
    kubeconfig: &Path,
    oc_binary: &str,
) -> Result<Box<dyn ClusterQuery>> {
    match transport {
        Transport::Oc => Ok(Box::new(OcClient::new(oc_binary, kubeconfig))),
        Transport::Api => Ok(Box::new(KubeApiClient::connect(kubeconfig)?)),
    }
}

/// Verify the cluster answers before any check runs.
///
/// Every OpenShift cluster has a `ClusterVersion` named `version`; failing to
/// read it means the audit cannot produce anything meaningful.
pub fn preflight(cluster: &dyn ClusterQuery) -> Result<Value> {
    cluster
        .get(&resource::CLUSTER_VERSION, None, "version")
        .map_err(|e| AuditError::ClusterUnreachable {
            message: e.to_string(),
        })
}
