//! Helpers shared by check implementations.

use serde_json::Value;

use crate::cluster::{resource, ClusterQuery, Selector};
use crate::error::Result;

/// Label carried by dedicated infrastructure nodes.
pub const INFRA_LABEL: &str = "node-role.kubernetes.io/infra";

/// Namespaces owned by the platform rather than by users.
const PLATFORM_NAMESPACES: &[&str] = &[
    "default",
    "openshift",
    "kube-system",
    "kube-public",
    "kube-node-lease",
];

/// String at a JSON pointer (`/status/desired/version`).
pub fn text<'a>(object: &'a Value, pointer: &str) -> Option<&'a str> {
    object.pointer(pointer).and_then(Value::as_str)
}

/// Non-empty string at a JSON pointer.
pub fn non_empty<'a>(object: &'a Value, pointer: &str) -> Option<&'a str> {
    text(object, pointer).filter(|s| !s.trim().is_empty())
}

/// Array at a JSON pointer; empty when absent.
pub fn array<'a>(object: &'a Value, pointer: &str) -> &'a [Value] {
    object
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Boolean at a JSON pointer; `false` when absent.
pub fn flag(object: &Value, pointer: &str) -> bool {
    object
        .pointer(pointer)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// `metadata.name`.
pub fn name(object: &Value) -> &str {
    text(object, "/metadata/name").unwrap_or("<unnamed>")
}

/// `metadata.namespace`, empty for cluster-scoped objects.
pub fn namespace(object: &Value) -> &str {
    text(object, "/metadata/namespace").unwrap_or_default()
}

/// `namespace/name` for namespaced objects, `name` otherwise.
pub fn qualified_name(object: &Value) -> String {
    match namespace(object) {
        "" => name(object).to_string(),
        ns => format!("{}/{}", ns, name(object)),
    }
}

/// Whether `metadata.labels` contains `key`.
pub fn has_label(object: &Value, key: &str) -> bool {
    object
        .pointer("/metadata/labels")
        .and_then(Value::as_object)
        .is_some_and(|labels| labels.contains_key(key))
}

/// Annotation value.
pub fn annotation<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object
        .pointer("/metadata/annotations")
        .and_then(|a| a.get(key))
        .and_then(Value::as_str)
}

/// Status of the condition of `kind` in `status.conditions` (`"True"`, ...).
pub fn condition<'a>(object: &'a Value, kind: &str) -> Option<&'a str> {
    array(object, "/status/conditions")
        .iter()
        .find(|c| c.get("type").and_then(Value::as_str) == Some(kind))
        .and_then(|c| c.get("status"))
        .and_then(Value::as_str)
}

/// Whether a condition is `"True"`.
pub fn condition_true(object: &Value, kind: &str) -> bool {
    condition(object, kind) == Some("True")
}

/// Whether a node selector map (`{label: value}`) targets infrastructure nodes.
pub fn selects_infra(selector: Option<&Value>) -> bool {
    selector
        .and_then(Value::as_object)
        .is_some_and(|labels| labels.contains_key(INFRA_LABEL))
}

/// Whether a namespace belongs to users rather than the platform.
pub fn is_user_namespace(ns: &str) -> bool {
    !(PLATFORM_NAMESPACES.contains(&ns) || ns.starts_with("openshift-") || ns.starts_with("kube-"))
}

/// Names of all user namespaces, sorted.
pub fn user_namespaces(cluster: &dyn ClusterQuery) -> Result<Vec<String>> {
    let mut names: Vec<String> = cluster
        .list(&resource::NAMESPACE, &Selector::all())?
        .iter()
        .map(|ns| name(ns).to_string())
        .filter(|ns| is_user_namespace(ns))
        .collect();
    names.sort();
    Ok(names)
}

/// First OLM subscription for `package`, in any namespace.
pub fn find_subscription(cluster: &dyn ClusterQuery, package: &str) -> Result<Option<Value>> {
    Ok(cluster
        .list(&resource::SUBSCRIPTION, &Selector::all())?
        .into_iter()
        .find(|s| text(s, "/spec/name") == Some(package)))
}

/// Render items as an AsciiDoc bullet list, capped at `max` entries.
pub fn bullet_list<S: AsRef<str>>(items: &[S], max: usize) -> String {
    let mut out: Vec<String> = items
        .iter()
        .take(max)
        .map(|item| format!("* {}", item.as_ref()))
        .collect();

    if items.len() > max {
        out.push(format!("* ... and {} more", items.len() - max));
    }

    out.join("\n")
}

/// `1 node` / `3 nodes`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::FakeCluster;
    use serde_json::json;

    #[test]
    fn pointer_helpers() {
        let obj = json!({
            "metadata": {"name": "a", "namespace": "ns", "labels": {"x": ""}, "annotations": {"k": "v"}},
            "spec": {"enabled": true, "empty": " ", "items": [1, 2]},
        });

        assert_eq!(text(&obj, "/metadata/name"), Some("a"));
        assert_eq!(non_empty(&obj, "/spec/empty"), None);
        assert_eq!(array(&obj, "/spec/items").len(), 2);
        assert!(array(&obj, "/spec/missing").is_empty());
        assert!(flag(&obj, "/spec/enabled"));
        assert!(!flag(&obj, "/spec/missing"));
        assert_eq!(qualified_name(&obj), "ns/a");
        assert!(has_label(&obj, "x"));
        assert_eq!(annotation(&obj, "k"), Some("v"));
    }

    #[test]
    fn infra_selector() {
        let selector = json!({"node-role.kubernetes.io/infra": ""});
        assert!(selects_infra(Some(&selector)));
        assert!(!selects_infra(Some(&json!({"kubernetes.io/os": "linux"}))));
        assert!(!selects_infra(None));
    }

    #[test]
    fn condition_lookup() {
        let obj = json!({"status": {"conditions": [
            {"type": "Available", "status": "True"},
            {"type": "Degraded", "status": "False"},
        ]}});

        assert!(condition_true(&obj, "Available"));
        assert!(!condition_true(&obj, "Degraded"));
        assert_eq!(condition(&obj, "Progressing"), None);
    }

    #[test]
    fn user_namespace_classification() {
        assert!(is_user_namespace("payments"));
        assert!(is_user_namespace("openshiftish"));
        assert!(!is_user_namespace("openshift-monitoring"));
        assert!(!is_user_namespace("kube-system"));
        assert!(!is_user_namespace("default"));
        assert!(!is_user_namespace("openshift"));
    }

    #[test]
    fn user_namespaces_sorted() {
        let cluster = FakeCluster::new().with_objects(
            &resource::NAMESPACE,
            vec![
                json!({"metadata": {"name": "zeta"}}),
                json!({"metadata": {"name": "openshift-etcd"}}),
                json!({"metadata": {"name": "alpha"}}),
            ],
        );
        assert_eq!(user_namespaces(&cluster).unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn subscription_lookup_by_package() {
        let cluster = FakeCluster::new().with_objects(
            &resource::SUBSCRIPTION,
            vec![json!({"metadata": {"name": "cl", "namespace": "openshift-logging"}, "spec": {"name": "cluster-logging"}})],
        );
        assert!(find_subscription(&cluster, "cluster-logging").unwrap().is_some());
        assert!(find_subscription(&cluster, "compliance-operator").unwrap().is_none());
    }

    #[test]
    fn bullet_list_caps_items() {
        let items = ["a", "b", "c"];
        assert_eq!(bullet_list(&items, 5), "* a\n* b\n* c");
        assert_eq!(bullet_list(&items, 2), "* a\n* b\n* ... and 1 more");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "node"), "1 node");
        assert_eq!(plural(0, "node"), "0 nodes");
    }
}
