//! Resource kinds and selectors understood by every transport.

use std::fmt;

/// A Kubernetes or OpenShift API resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    /// API group (empty for the core group).
    pub group: &'static str,
    /// API version.
    pub version: &'static str,
    /// Kind as it appears in object manifests.
    pub kind: &'static str,
    /// Lowercase plural used in URLs and on the `oc` command line.
    pub plural: &'static str,
}

impl ResourceKind {
    const fn new(
        group: &'static str,
        version: &'static str,
        kind: &'static str,
        plural: &'static str,
    ) -> Self {
        Self {
            group,
            version,
            kind,
            plural,
        }
    }

    /// Fully qualified resource name accepted by `oc get`.
    ///
    /// Qualifying with the group avoids ambiguity between kinds that share a
    /// plural across API groups (for example `networks`).
    pub fn qualified_name(&self) -> String {
        if self.group.is_empty() {
            self.plural.to_string()
        } else {
            format!("{}.{}", self.plural, self.group)
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind)
    }
}

// Core
pub const NODE: ResourceKind = ResourceKind::new("", "v1", "Node", "nodes");
pub const NAMESPACE: ResourceKind = ResourceKind::new("", "v1", "Namespace", "namespaces");
pub const POD: ResourceKind = ResourceKind::new("", "v1", "Pod", "pods");
pub const SECRET: ResourceKind = ResourceKind::new("", "v1", "Secret", "secrets");
pub const CONFIG_MAP: ResourceKind = ResourceKind::new("", "v1", "ConfigMap", "configmaps");
pub const PERSISTENT_VOLUME: ResourceKind =
    ResourceKind::new("", "v1", "PersistentVolume", "persistentvolumes");
pub const RESOURCE_QUOTA: ResourceKind =
    ResourceKind::new("", "v1", "ResourceQuota", "resourcequotas");
pub const LIMIT_RANGE: ResourceKind = ResourceKind::new("", "v1", "LimitRange", "limitranges");

// Kubernetes groups
pub const CRON_JOB: ResourceKind = ResourceKind::new("batch", "v1", "CronJob", "cronjobs");
pub const NETWORK_POLICY: ResourceKind = ResourceKind::new(
    "networking.k8s.io",
    "v1",
    "NetworkPolicy",
    "networkpolicies",
);
pub const STORAGE_CLASS: ResourceKind =
    ResourceKind::new("storage.k8s.io", "v1", "StorageClass", "storageclasses");
pub const CLUSTER_ROLE_BINDING: ResourceKind = ResourceKind::new(
    "rbac.authorization.k8s.io",
    "v1",
    "ClusterRoleBinding",
    "clusterrolebindings",
);

// config.openshift.io
pub const CLUSTER_VERSION: ResourceKind = ResourceKind::new(
    "config.openshift.io",
    "v1",
    "ClusterVersion",
    "clusterversions",
);
pub const CLUSTER_OPERATOR: ResourceKind = ResourceKind::new(
    "config.openshift.io",
    "v1",
    "ClusterOperator",
    "clusteroperators",
);
pub const INFRASTRUCTURE: ResourceKind = ResourceKind::new(
    "config.openshift.io",
    "v1",
    "Infrastructure",
    "infrastructures",
);
pub const OAUTH: ResourceKind = ResourceKind::new("config.openshift.io", "v1", "OAuth", "oauths");
pub const API_SERVER: ResourceKind =
    ResourceKind::new("config.openshift.io", "v1", "APIServer", "apiservers");
pub const NETWORK_CONFIG: ResourceKind =
    ResourceKind::new("config.openshift.io", "v1", "Network", "networks");
pub const PROXY: ResourceKind = ResourceKind::new("config.openshift.io", "v1", "Proxy", "proxies");
pub const IMAGE_CONFIG: ResourceKind =
    ResourceKind::new("config.openshift.io", "v1", "Image", "images");
pub const PROJECT_CONFIG: ResourceKind =
    ResourceKind::new("config.openshift.io", "v1", "Project", "projects");
pub const SCHEDULER: ResourceKind =
    ResourceKind::new("config.openshift.io", "v1", "Scheduler", "schedulers");

// Operators
pub const INGRESS_CONTROLLER: ResourceKind = ResourceKind::new(
    "operator.openshift.io",
    "v1",
    "IngressController",
    "ingresscontrollers",
);
pub const CLUSTER_CSI_DRIVER: ResourceKind = ResourceKind::new(
    "operator.openshift.io",
    "v1",
    "ClusterCSIDriver",
    "clustercsidrivers",
);
pub const IMAGE_REGISTRY_CONFIG: ResourceKind = ResourceKind::new(
    "imageregistry.operator.openshift.io",
    "v1",
    "Config",
    "configs",
);
pub const SUBSCRIPTION: ResourceKind = ResourceKind::new(
    "operators.coreos.com",
    "v1alpha1",
    "Subscription",
    "subscriptions",
);
pub const CLUSTER_SERVICE_VERSION: ResourceKind = ResourceKind::new(
    "operators.coreos.com",
    "v1alpha1",
    "ClusterServiceVersion",
    "clusterserviceversions",
);
pub const CLUSTER_LOGGING: ResourceKind = ResourceKind::new(
    "logging.openshift.io",
    "v1",
    "ClusterLogging",
    "clusterloggings",
);
pub const CLUSTER_LOG_FORWARDER: ResourceKind = ResourceKind::new(
    "logging.openshift.io",
    "v1",
    "ClusterLogForwarder",
    "clusterlogforwarders",
);

// Machine management
pub const MACHINE_CONFIG_POOL: ResourceKind = ResourceKind::new(
    "machineconfiguration.openshift.io",
    "v1",
    "MachineConfigPool",
    "machineconfigpools",
);
pub const MACHINE_HEALTH_CHECK: ResourceKind = ResourceKind::new(
    "machine.openshift.io",
    "v1beta1",
    "MachineHealthCheck",
    "machinehealthchecks",
);
pub const CLUSTER_AUTOSCALER: ResourceKind = ResourceKind::new(
    "autoscaling.openshift.io",
    "v1",
    "ClusterAutoscaler",
    "clusterautoscalers",
);

// Security and routing
pub const SECURITY_CONTEXT_CONSTRAINTS: ResourceKind = ResourceKind::new(
    "security.openshift.io",
    "v1",
    "SecurityContextConstraints",
    "securitycontextconstraints",
);
pub const ROUTE: ResourceKind = ResourceKind::new("route.openshift.io", "v1", "Route", "routes");

/// Scope and filter for a list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Restrict to one namespace; `None` lists cluster-wide.
    pub namespace: Option<String>,
    /// Label selector in `key=value,key2` form.
    pub labels: Option<String>,
}

impl Selector {
    /// Cluster-wide, unfiltered.
    pub fn all() -> Self {
        Self::default()
    }

    /// Everything in one namespace.
    pub fn namespace(namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            labels: None,
        }
    }

    /// Add a label selector.
    pub fn with_labels(mut self, labels: &str) -> Self {
        self.labels = Some(labels.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_kind_is_plural_only() {
        assert_eq!(NODE.qualified_name(), "nodes");
    }

    #[test]
    fn grouped_kind_is_qualified() {
        assert_eq!(
            CLUSTER_VERSION.qualified_name(),
            "clusterversions.config.openshift.io"
        );
    }

    #[test]
    fn display_uses_kind() {
        assert_eq!(SECURITY_CONTEXT_CONSTRAINTS.to_string(), "SecurityContextConstraints");
    }

    #[test]
    fn selector_builders() {
        assert_eq!(Selector::all(), Selector::default());

        let sel = Selector::namespace("openshift-etcd").with_labels("app=etcd");
        assert_eq!(sel.namespace.as_deref(), Some("openshift-etcd"));
        assert_eq!(sel.labels.as_deref(), Some("app=etcd"));
    }
}
