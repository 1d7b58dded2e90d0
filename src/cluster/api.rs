//! Kubernetes REST transport.
//!
//! Uses kube-rs dynamic objects so OpenShift kinds need no generated types.
//! The rest of ocaudit is synchronous, so the client owns a current-thread
//! tokio runtime and blocks on each request.

use std::path::Path;

use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::GroupVersionKind;
use kube::{Client, Config};
use serde_json::Value;
use tokio::runtime::Runtime;

use super::{ClusterQuery, ResourceKind, Selector};
use crate::error::{AuditError, Result};

/// Queries the cluster through the Kubernetes API server.
pub struct KubeApiClient {
    runtime: Runtime,
    client: Client,
}

impl KubeApiClient {
    /// Build a client from the kubeconfig at `path` (current context).
    pub fn connect(path: &Path) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let kubeconfig =
            Kubeconfig::read_from(path).map_err(|e| AuditError::KubeconfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let client = runtime.block_on(async {
            let config =
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| AuditError::KubeconfigParseError {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
            Client::try_from(config).map_err(|e| AuditError::ClusterUnreachable {
                message: e.to_string(),
            })
        })?;

        Ok(Self { runtime, client })
    }

    fn api(&self, kind: &ResourceKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(kind.group, kind.version, kind.kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, kind.plural);
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

fn map_error(kind: &ResourceKind, name: &str, err: kube::Error) -> AuditError {
    match err {
        kube::Error::Api(response) if response.code == 404 => AuditError::NotFound {
            kind: kind.kind.to_string(),
            name: name.to_string(),
        },
        other => AuditError::QueryFailed {
            resource: kind.qualified_name(),
            message: other.to_string(),
        },
    }
}

fn to_json(kind: &ResourceKind, object: &DynamicObject) -> Result<Value> {
    serde_json::to_value(object).map_err(|e| AuditError::unexpected(kind.kind, e.to_string()))
}

impl ClusterQuery for KubeApiClient {
    fn transport(&self) -> &'static str {
        "api"
    }

    fn get(&self, kind: &ResourceKind, namespace: Option<&str>, name: &str) -> Result<Value> {
        let api = self.api(kind, namespace);
        let object = self
            .runtime
            .block_on(api.get(name))
            .map_err(|e| map_error(kind, name, e))?;
        to_json(kind, &object)
    }

    fn list(&self, kind: &ResourceKind, selector: &Selector) -> Result<Vec<Value>> {
        let api = self.api(kind, selector.namespace.as_deref());
        let mut params = ListParams::default();
        if let Some(labels) = &selector.labels {
            params = params.labels(labels);
        }

        let list = self
            .runtime
            .block_on(api.list(&params))
            .map_err(|e| map_error(kind, kind.plural, e))?;

        list.items.iter().map(|item| to_json(kind, item)).collect()
    }
}
