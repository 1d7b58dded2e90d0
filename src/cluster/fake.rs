//! In-memory cluster for tests.
//!
//! `FakeCluster` implements [`ClusterQuery`] over a set of JSON fixtures.
//! Objects are keyed by kind plus their own `metadata.namespace` and
//! `metadata.name`, so fixtures read exactly like `oc get -o json` output.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use super::{ClusterQuery, ResourceKind, Selector};
use crate::error::{AuditError, Result};

/// Fixture-backed [`ClusterQuery`] implementation.
#[derive(Debug, Default, Clone)]
pub struct FakeCluster {
    objects: Vec<(ResourceKind, Value)>,
    failures: HashMap<&'static str, String>,
}

impl FakeCluster {
    /// Create an empty cluster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object of `kind`.
    pub fn with_object(mut self, kind: &ResourceKind, object: Value) -> Self {
        self.objects.push((*kind, object));
        self
    }

    /// Add several objects of the same kind.
    pub fn with_objects(mut self, kind: &ResourceKind, objects: Vec<Value>) -> Self {
        for object in objects {
            self.objects.push((*kind, object));
        }
        self
    }

    /// Make every query for `kind` fail with `message`.
    pub fn with_failure(mut self, kind: &ResourceKind, message: &str) -> Self {
        self.failures.insert(kind.kind, message.to_string());
        self
    }

    fn check_failure(&self, kind: &ResourceKind) -> Result<()> {
        match self.failures.get(kind.kind) {
            Some(message) => Err(AuditError::QueryFailed {
                resource: kind.qualified_name(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn of_kind<'a>(&'a self, kind: &'a ResourceKind) -> impl Iterator<Item = &'a Value> + 'a {
        self.objects
            .iter()
            .filter(move |(k, _)| k == kind)
            .map(|(_, v)| v)
    }
}

fn metadata_str<'a>(object: &'a Value, field: &str) -> Option<&'a str> {
    object.get("metadata")?.get(field)?.as_str()
}

fn labels_match(object: &Value, selector: &str) -> bool {
    let labels: BTreeMap<String, String> = object
        .get("metadata")
        .and_then(|m| m.get("labels"))
        .and_then(|l| serde_json::from_value(l.clone()).ok())
        .unwrap_or_default();

    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
            None => labels.contains_key(term),
        })
}

impl ClusterQuery for FakeCluster {
    fn transport(&self) -> &'static str {
        "fake"
    }

    fn get(&self, kind: &ResourceKind, namespace: Option<&str>, name: &str) -> Result<Value> {
        self.check_failure(kind)?;

        self.of_kind(kind)
            .find(|object| {
                metadata_str(object, "name") == Some(name)
                    && (namespace.is_none() || metadata_str(object, "namespace") == namespace)
            })
            .cloned()
            .ok_or_else(|| AuditError::NotFound {
                kind: kind.kind.to_string(),
                name: name.to_string(),
            })
    }

    fn list(&self, kind: &ResourceKind, selector: &Selector) -> Result<Vec<Value>> {
        self.check_failure(kind)?;

        Ok(self
            .of_kind(kind)
            .filter(|object| match &selector.namespace {
                Some(ns) => metadata_str(object, "namespace") == Some(ns.as_str()),
                None => true,
            })
            .filter(|object| match &selector.labels {
                Some(labels) => labels_match(object, labels),
                None => true,
            })
            .cloned()
            .collect())
    }
}
