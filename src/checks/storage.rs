//! Storage class, persistent volume and registry storage checks.

use serde_json::Value;

use super::support::{annotation, bullet_list, name, plural, text};
use super::{Category, CheckContext, CheckEntry, CheckResult};
use crate::cluster::{resource, Selector};
use crate::error::Result;

const DEFAULT_CLASS_ANNOTATIONS: [&str; 2] = [
    "storageclass.kubernetes.io/is-default-class",
    "storageclass.beta.kubernetes.io/is-default-class",
];

fn is_default_class(class: &Value) -> bool {
    DEFAULT_CLASS_ANNOTATIONS
        .iter()
        .any(|key| annotation(class, key) == Some("true"))
}

pub(super) fn entries() -> Vec<CheckEntry> {
    vec![
        CheckEntry {
            name: "default-storage-class",
            title: "Default Storage Class",
            category: Category::Storage,
            references: &[
                "https://docs.openshift.com/container-platform/latest/storage/dynamic-provisioning.html",
            ],
            run: default_storage_class,
        },
        CheckEntry {
            name: "persistent-volumes",
            title: "Persistent Volume Status",
            category: Category::Storage,
            references: &[
                "https://docs.openshift.com/container-platform/latest/storage/understanding-persistent-storage.html",
            ],
            run: persistent_volumes,
        },
        CheckEntry {
            name: "registry-storage",
            title: "Image Registry Storage",
            category: Category::Storage,
            references: &[
                "https://docs.openshift.com/container-platform/latest/registry/configuring_registry_storage/configuring-registry-storage-baremetal.html",
            ],
            run: registry_storage,
        },
    ]
}

fn default_storage_class(ctx: &CheckContext) -> Result<CheckResult> {
    let classes = ctx.cluster.list(&resource::STORAGE_CLASS, &Selector::all())?;
    let defaults: Vec<&str> = classes
        .iter()
        .filter(|c| is_default_class(c))
        .map(|c| name(c))
        .collect();

    match defaults.as_slice() {
        [] => Ok(CheckResult::required(
            format!(
                "None of the {} is marked as default.",
                plural(classes.len(), "storage class")
            ),
            "Mark one storage class as default so claims without a class are provisioned.",
        )),
        [single] => Ok(CheckResult::no_change(format!(
            "Default storage class: {}.",
            single
        ))),
        many => Ok(CheckResult::recommended(
            format!("Several storage classes are marked default: {}.", many.join(", ")),
            "Keep exactly one default storage class; provisioning picks one unpredictably otherwise.",
        )),
    }
}

fn persistent_volumes(ctx: &CheckContext) -> Result<CheckResult> {
    let volumes = ctx
        .cluster
        .list(&resource::PERSISTENT_VOLUME, &Selector::all())?;

    let stale: Vec<String> = volumes
        .iter()
        .filter_map(|pv| match text(pv, "/status/phase") {
            Some(phase @ ("Failed" | "Released")) => Some(format!("{} ({})", name(pv), phase)),
            _ => None,
        })
        .collect();

    if stale.is_empty() {
        Ok(CheckResult::no_change(format!(
            "All {} are bound or available.",
            plural(volumes.len(), "persistent volume")
        )))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "Persistent volumes needing attention:\n\n{}",
                bullet_list(&stale, ctx.thresholds.max_listed_items)
            ),
            "Reclaim or delete released and failed volumes.",
        ))
    }
}

fn registry_storage(ctx: &CheckContext) -> Result<CheckResult> {
    let registry = ctx
        .cluster
        .get(&resource::IMAGE_REGISTRY_CONFIG, None, "cluster")?;

    if text(&registry, "/spec/managementState") == Some("Removed") {
        return Ok(CheckResult::advisory(
            "The internal image registry is removed.",
            "Confirm builds and image streams are not needed on this cluster.",
        ));
    }

    let backends: Vec<&str> = registry
        .pointer("/spec/storage")
        .and_then(|s| s.as_object())
        .map(|s| {
            s.keys()
                .map(String::as_str)
                .filter(|k| *k != "managementState")
                .collect()
        })
        .unwrap_or_default();

    if backends.contains(&"emptyDir") {
        Ok(CheckResult::required(
            "The image registry stores images in an emptyDir volume.",
            "Configure persistent storage for the registry; emptyDir content is lost when the pod restarts.",
        ))
    } else if backends.is_empty() {
        Ok(CheckResult::required(
            "No storage is configured for the image registry.",
            "Configure persistent storage for the registry.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "The image registry uses {} storage.",
            backends.join(", ")
        )))
    }
}
