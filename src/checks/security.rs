//! Authentication, authorization and API server hardening checks.

use serde_json::Value;

use super::support::{array, bullet_list, find_subscription, name, non_empty, plural, text};
use super::{Category, CheckContext, CheckEntry, CheckResult};
use crate::cluster::{resource, Selector};
use crate::error::Result;

/// SCCs shipped with the platform.
const DEFAULT_SCCS: &[&str] = &[
    "anyuid",
    "hostaccess",
    "hostmount-anyuid",
    "hostnetwork",
    "hostnetwork-v2",
    "machine-api-termination-handler",
    "nonroot",
    "nonroot-v2",
    "privileged",
    "restricted",
    "restricted-v2",
];

pub(super) fn entries() -> Vec<CheckEntry> {
    vec![
        CheckEntry {
            name: "identity-provider",
            title: "Identity Provider",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/authentication/understanding-identity-provider.html",
            ],
            run: identity_provider,
        },
        CheckEntry {
            name: "kubeadmin-user",
            title: "Kubeadmin User",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/authentication/remove-kubeadmin.html",
            ],
            run: kubeadmin_user,
        },
        CheckEntry {
            name: "default-scc",
            title: "Default Security Context Constraints",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/authentication/managing-security-context-constraints.html",
            ],
            run: default_scc,
        },
        CheckEntry {
            name: "custom-scc",
            title: "Custom Security Context Constraints",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/authentication/managing-security-context-constraints.html",
            ],
            run: custom_scc,
        },
        CheckEntry {
            name: "self-provisioner",
            title: "Self Provisioner",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/applications/projects/configuring-project-creation.html",
            ],
            run: self_provisioner,
        },
        CheckEntry {
            name: "cluster-admin-bindings",
            title: "Cluster Admin Bindings",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/authentication/using-rbac.html",
            ],
            run: cluster_admin_bindings,
        },
        CheckEntry {
            name: "etcd-encryption",
            title: "ETCD Encryption",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/security/encrypting-etcd.html",
            ],
            run: etcd_encryption,
        },
        CheckEntry {
            name: "api-server-certificate",
            title: "API Server Certificate",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/security/certificates/api-server.html",
            ],
            run: api_server_certificate,
        },
        CheckEntry {
            name: "tls-security-profile",
            title: "TLS Security Profile",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/security/tls-security-profiles.html",
            ],
            run: tls_security_profile,
        },
        CheckEntry {
            name: "oauth-token-timeout",
            title: "OAuth Token Inactivity Timeout",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/authentication/configuring-internal-oauth.html",
            ],
            run: oauth_token_timeout,
        },
        CheckEntry {
            name: "api-audit-profile",
            title: "API Audit Profile",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/security/audit-log-policy-config.html",
            ],
            run: api_audit_profile,
        },
        CheckEntry {
            name: "compliance-operator",
            title: "Compliance Operator",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/security/compliance_operator/co-overview.html",
            ],
            run: compliance_operator,
        },
        CheckEntry {
            name: "allowed-registries",
            title: "Allowed Image Registries",
            category: Category::Security,
            references: &[
                "https://docs.openshift.com/container-platform/latest/openshift_images/image-configuration.html",
            ],
            run: allowed_registries,
        },
    ]
}

fn is_system_subject(subject: &str) -> bool {
    subject.starts_with("system:")
}

fn api_server(ctx: &CheckContext) -> Result<Value> {
    ctx.cluster.get(&resource::API_SERVER, None, "cluster")
}

fn identity_provider(ctx: &CheckContext) -> Result<CheckResult> {
    let oauth = ctx.cluster.get(&resource::OAUTH, None, "cluster")?;
    let providers: Vec<(String, String)> = array(&oauth, "/spec/identityProviders")
        .iter()
        .map(|p| {
            (
                text(p, "/name").unwrap_or("unnamed").to_string(),
                text(p, "/type").unwrap_or("unknown").to_string(),
            )
        })
        .collect();

    if providers.is_empty() {
        return Ok(CheckResult::required(
            "No identity provider is configured.",
            "Configure an identity provider backed by the organization's directory (LDAP, OpenID Connect, ...).",
        ));
    }

    let listing: Vec<String> = providers
        .iter()
        .map(|(name, kind)| format!("{} ({})", name, kind))
        .collect();
    let listing = bullet_list(&listing, ctx.thresholds.max_listed_items);

    if providers.iter().all(|(_, kind)| kind == "HTPasswd") {
        Ok(CheckResult::recommended(
            format!("Only HTPasswd identity providers are configured:\n\n{}", listing),
            "HTPasswd does not scale to many users or enforce password policy. Use a centralized identity provider.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "Configured identity providers:\n\n{}",
            listing
        )))
    }
}

fn kubeadmin_user(ctx: &CheckContext) -> Result<CheckResult> {
    match ctx
        .cluster
        .find(&resource::SECRET, Some("kube-system"), "kubeadmin")?
    {
        Some(_) => Ok(CheckResult::recommended(
            "The kubeadmin secret still exists.",
            "Remove the kubeadmin user once an identity provider and a cluster administrator are in place.",
        )),
        None => Ok(CheckResult::no_change("The kubeadmin user has been removed.")),
    }
}

fn default_scc(ctx: &CheckContext) -> Result<CheckResult> {
    let sccs = ctx
        .cluster
        .list(&resource::SECURITY_CONTEXT_CONSTRAINTS, &Selector::all())?;

    let modified: Vec<String> = sccs
        .iter()
        .filter(|scc| DEFAULT_SCCS.contains(&name(scc)))
        .filter_map(|scc| {
            let subjects: Vec<&str> = array(scc, "/users")
                .iter()
                .chain(array(scc, "/groups"))
                .filter_map(Value::as_str)
                .filter(|s| !is_system_subject(s))
                .collect();
            (!subjects.is_empty()).then(|| format!("{}: {}", name(scc), subjects.join(", ")))
        })
        .collect();

    if modified.is_empty() {
        Ok(CheckResult::no_change(
            "Default SCCs grant access only to system users and groups.",
        ))
    } else {
        Ok(CheckResult::recommended(
            format!(
                "Default SCCs were modified to grant access to:\n\n{}",
                bullet_list(&modified, ctx.thresholds.max_listed_items)
            ),
            "Leave the default SCCs untouched. Grant access through RBAC `use` permissions or a custom SCC instead.",
        ))
    }
}

fn custom_scc(ctx: &CheckContext) -> Result<CheckResult> {
    let sccs = ctx
        .cluster
        .list(&resource::SECURITY_CONTEXT_CONSTRAINTS, &Selector::all())?;
    let custom: Vec<&str> = sccs
        .iter()
        .map(|scc| name(scc))
        .filter(|n| !DEFAULT_SCCS.contains(n))
        .collect();

    if custom.is_empty() {
        Ok(CheckResult::no_change("Only the default SCCs exist."))
    } else {
        Ok(CheckResult::advisory(
            format!(
                "Custom SCCs:\n\n{}",
                bullet_list(&custom, ctx.thresholds.max_listed_items)
            ),
            "Review each custom SCC and confirm its privileges are still required.",
        ))
    }
}

fn self_provisioner(ctx: &CheckContext) -> Result<CheckResult> {
    let Some(binding) = ctx
        .cluster
        .find(&resource::CLUSTER_ROLE_BINDING, None, "self-provisioners")?
    else {
        return Ok(CheckResult::no_change("The self-provisioners binding has been removed."));
    };

    let open = array(&binding, "/subjects")
        .iter()
        .any(|s| text(s, "/name") == Some("system:authenticated:oauth"));

    if open {
        Ok(CheckResult::recommended(
            "Every authenticated user can create projects.",
            "Restrict project creation to a dedicated group if projects should be requested through a process.",
        ))
    } else {
        Ok(CheckResult::no_change(
            "Project self-provisioning is restricted.",
        ))
    }
}

fn cluster_admin_bindings(ctx: &CheckContext) -> Result<CheckResult> {
    let bindings = ctx
        .cluster
        .list(&resource::CLUSTER_ROLE_BINDING, &Selector::all())?;

    let subjects: Vec<String> = bindings
        .iter()
        .filter(|b| text(b, "/roleRef/name") == Some("cluster-admin"))
        .flat_map(|b| array(b, "/subjects").iter())
        .filter_map(|s| {
            let subject = text(s, "/name")?;
            (!is_system_subject(subject))
                .then(|| format!("{} {}", text(s, "/kind").unwrap_or("Subject"), subject))
        })
        .collect();

    let observation = format!(
        "{} bound to cluster-admin:\n\n{}",
        plural(subjects.len(), "non-system subject"),
        bullet_list(&subjects, ctx.thresholds.max_listed_items)
    );

    if subjects.len() > ctx.thresholds.max_cluster_admins {
        Ok(CheckResult::recommended(
            observation,
            "Reduce cluster-admin grants to a small administrators group and delegate narrower roles.",
        ))
    } else if subjects.is_empty() {
        Ok(CheckResult::no_change(
            "Only system subjects are bound to cluster-admin.",
        ))
    } else {
        Ok(CheckResult::no_change(observation))
    }
}

fn etcd_encryption(ctx: &CheckContext) -> Result<CheckResult> {
    let server = api_server(ctx)?;

    match non_empty(&server, "/spec/encryption/type") {
        Some(kind @ ("aescbc" | "aesgcm")) => Ok(CheckResult::no_change(format!(
            "etcd data is encrypted with {}.",
            kind
        ))),
        other => Ok(CheckResult::recommended(
            format!(
                "etcd encryption type is {}.",
                other.unwrap_or("not configured")
            ),
            "Enable etcd encryption (aesgcm or aescbc) to protect secrets at rest.",
        )),
    }
}

fn api_server_certificate(ctx: &CheckContext) -> Result<CheckResult> {
    let server = api_server(ctx)?;
    let names: Vec<String> = array(&server, "/spec/servingCerts/namedCertificates")
        .iter()
        .flat_map(|c| array(c, "/names").iter())
        .filter_map(Value::as_str)
        .map(String::from)
        .collect();

    if names.is_empty() {
        Ok(CheckResult::recommended(
            "The API server uses the certificate generated at installation.",
            "Add a named certificate issued by a trusted CA for the API endpoint.",
        ))
    } else {
        Ok(CheckResult::no_change(format!(
            "Named API server certificates for:\n\n{}",
            bullet_list(&names, ctx.thresholds.max_listed_items)
        )))
    }
}

fn tls_security_profile(ctx: &CheckContext) -> Result<CheckResult> {
    let server = api_server(ctx)?;
    let profile = non_empty(&server, "/spec/tlsSecurityProfile/type").unwrap_or("Intermediate");

    match profile {
        "Old" => Ok(CheckResult::required(
            "The API server accepts the Old TLS profile.",
            "Switch to the Intermediate or Modern TLS profile.",
        )),
        "Custom" => Ok(CheckResult::advisory(
            "The API server uses a Custom TLS profile.",
            "Review the custom ciphers and minimum TLS version.",
        )),
        other => Ok(CheckResult::no_change(format!(
            "The API server uses the {} TLS profile.",
            other
        ))),
    }
}

fn oauth_token_timeout(ctx: &CheckContext) -> Result<CheckResult> {
    let oauth = ctx.cluster.get(&resource::OAUTH, None, "cluster")?;

    match non_empty(&oauth, "/spec/tokenConfig/accessTokenInactivityTimeout") {
        Some(timeout) => Ok(CheckResult::no_change(format!(
            "OAuth tokens expire after {} of inactivity.",
            timeout
        ))),
        None => Ok(CheckResult::recommended(
            "No OAuth token inactivity timeout is set.",
            "Set accessTokenInactivityTimeout so idle sessions expire.",
        )),
    }
}

fn api_audit_profile(ctx: &CheckContext) -> Result<CheckResult> {
    let server = api_server(ctx)?;
    let profile = non_empty(&server, "/spec/audit/profile").unwrap_or("Default");

    match profile {
        "None" => Ok(CheckResult::required(
            "API audit logging is disabled.",
            "Enable at least the Default audit profile.",
        )),
        "WriteRequestBodies" | "AllRequestBodies" => Ok(CheckResult::advisory(
            format!("API audit profile {} logs request bodies.", profile),
            "Request body logging increases log volume and may capture sensitive data; confirm it is needed.",
        )),
        other => Ok(CheckResult::no_change(format!(
            "API audit profile: {}.",
            other
        ))),
    }
}

fn compliance_operator(ctx: &CheckContext) -> Result<CheckResult> {
    match find_subscription(ctx.cluster, "compliance-operator")? {
        Some(sub) => Ok(CheckResult::no_change(format!(
            "The Compliance Operator is installed in {}.",
            text(&sub, "/metadata/namespace").unwrap_or("an unknown namespace")
        ))),
        None => Ok(CheckResult::advisory(
            "The Compliance Operator is not installed.",
            "Install the Compliance Operator to scan the cluster against CIS or other benchmarks.",
        )),
    }
}

fn allowed_registries(ctx: &CheckContext) -> Result<CheckResult> {
    let image = ctx.cluster.get(&resource::IMAGE_CONFIG, None, "cluster")?;
    let allowed = array(&image, "/spec/registrySources/allowedRegistries");
    let blocked = array(&image, "/spec/registrySources/blockedRegistries");

    if allowed.is_empty() && blocked.is_empty() {
        return Ok(CheckResult::advisory(
            "Images may be pulled from any registry.",
            "Restrict image sources with an allowed or blocked registry list.",
        ));
    }

    let describe = |list: &[Value]| {
        list.iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    Ok(CheckResult::no_change(format!(
        "Allowed registries: {}. Blocked registries: {}.",
        if allowed.is_empty() { "-".to_string() } else { describe(allowed) },
        if blocked.is_empty() { "-".to_string() } else { describe(blocked) }
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{run_check, StaticFeed};
    use crate::checks::Verdict;
    use crate::cluster::FakeCluster;
    use serde_json::json;

    fn feed() -> StaticFeed {
        StaticFeed::new(&[])
    }

    fn oauth(spec: Value) -> FakeCluster {
        FakeCluster::new().with_object(
            &resource::OAUTH,
            json!({"metadata": {"name": "cluster"}, "spec": spec}),
        )
    }

    fn api_server_with(spec: Value) -> FakeCluster {
        FakeCluster::new().with_object(
            &resource::API_SERVER,
            json!({"metadata": {"name": "cluster"}, "spec": spec}),
        )
    }

    #[test]
    fn identity_provider_verdicts() {
        let none = oauth(json!({}));
        assert_eq!(run_check(identity_provider, &none, &feed()).verdict, Verdict::Required);

        let htpasswd = oauth(json!({"identityProviders": [{"name": "local", "type": "HTPasswd"}]}));
        assert_eq!(run_check(identity_provider, &htpasswd, &feed()).verdict, Verdict::Recommended);

        let ldap = oauth(json!({"identityProviders": [
            {"name": "local", "type": "HTPasswd"},
            {"name": "corp", "type": "LDAP"}
        ]}));
        let result = run_check(identity_provider, &ldap, &feed());
        assert_eq!(result.verdict, Verdict::NoChange);
        assert!(result.observation.contains("corp (LDAP)"));
    }

    #[test]
    fn kubeadmin_present_is_recommended() {
        let cluster = FakeCluster::new().with_object(
            &resource::SECRET,
            json!({"metadata": {"name": "kubeadmin", "namespace": "kube-system"}}),
        );
        assert_eq!(run_check(kubeadmin_user, &cluster, &feed()).verdict, Verdict::Recommended);
        assert_eq!(
            run_check(kubeadmin_user, &FakeCluster::new(), &feed()).verdict,
            Verdict::NoChange
        );
    }

    #[test]
    fn modified_default_scc() {
        let cluster = FakeCluster::new().with_objects(
            &resource::SECURITY_CONTEXT_CONSTRAINTS,
            vec![
                json!({"metadata": {"name": "privileged"}, "users": ["system:admin", "alice"], "groups": []}),
                json!({"metadata": {"name": "restricted-v2"}, "users": [], "groups": ["system:authenticated"]}),
                json!({"metadata": {"name": "team-scc"}, "users": ["bob"]}),
            ],
        );
        let result = run_check(default_scc, &cluster, &feed());
        assert_eq!(result.verdict, Verdict::Recommended);
        assert!(result.observation.contains("privileged: alice"));
        assert!(!result.observation.contains("bob"));

        let custom = run_check(custom_scc, &cluster, &feed());
        assert_eq!(custom.verdict, Verdict::Advisory);
        assert!(custom.observation.contains("team-scc"));
    }

    #[test]
    fn self_provisioner_open_to_everyone() {
        let cluster = FakeCluster::new().with_object(
            &resource::CLUSTER_ROLE_BINDING,
            json!({
                "metadata": {"name": "self-provisioners"},
                "roleRef": {"name": "self-provisioner"},
                "subjects": [{"kind": "Group", "name": "system:authenticated:oauth"}]
            }),
        );
        assert_eq!(run_check(self_provisioner, &cluster, &feed()).verdict, Verdict::Recommended);
    }

    #[test]
    fn too_many_cluster_admins() {
        let subjects: Vec<Value> = (0..7)
            .map(|i| json!({"kind": "User", "name": format!("admin{}", i)}))
            .chain(std::iter::once(json!({"kind": "Group", "name": "system:masters"})))
            .collect();
        let cluster = FakeCluster::new().with_object(
            &resource::CLUSTER_ROLE_BINDING,
            json!({"metadata": {"name": "admins"}, "roleRef": {"name": "cluster-admin"}, "subjects": subjects}),
        );
        let result = run_check(cluster_admin_bindings, &cluster, &feed());
        assert_eq!(result.verdict, Verdict::Recommended);
        assert!(result.observation.starts_with("7 non-system subjects"));
        assert!(!result.observation.contains("system:masters"));
    }

    #[test]
    fn etcd_encryption_types() {
        let enabled = api_server_with(json!({"encryption": {"type": "aesgcm"}}));
        assert_eq!(run_check(etcd_encryption, &enabled, &feed()).verdict, Verdict::NoChange);

        let identity = api_server_with(json!({"encryption": {"type": "identity"}}));
        assert_eq!(run_check(etcd_encryption, &identity, &feed()).verdict, Verdict::Recommended);

        let unset = api_server_with(json!({}));
        assert_eq!(run_check(etcd_encryption, &unset, &feed()).verdict, Verdict::Recommended);
    }

    #[test]
    fn api_server_profiles() {
        let old = api_server_with(json!({"tlsSecurityProfile": {"type": "Old"}}));
        assert_eq!(run_check(tls_security_profile, &old, &feed()).verdict, Verdict::Required);

        let default = api_server_with(json!({}));
        assert_eq!(run_check(tls_security_profile, &default, &feed()).verdict, Verdict::NoChange);
        assert_eq!(run_check(api_audit_profile, &default, &feed()).verdict, Verdict::NoChange);
        assert_eq!(
            run_check(api_server_certificate, &default, &feed()).verdict,
            Verdict::Recommended
        );

        let no_audit = api_server_with(json!({"audit": {"profile": "None"}}));
        assert_eq!(run_check(api_audit_profile, &no_audit, &feed()).verdict, Verdict::Required);

        let bodies = api_server_with(json!({"audit": {"profile": "AllRequestBodies"}}));
        assert_eq!(run_check(api_audit_profile, &bodies, &feed()).verdict, Verdict::Advisory);
    }

    #[test]
    fn token_timeout() {
        let set = oauth(json!({"tokenConfig": {"accessTokenInactivityTimeout": "30m0s"}}));
        assert_eq!(run_check(oauth_token_timeout, &set, &feed()).verdict, Verdict::NoChange);
        assert_eq!(
            run_check(oauth_token_timeout, &oauth(json!({})), &feed()).verdict,
            Verdict::Recommended
        );
    }

    #[test]
    fn compliance_operator_absent_is_advisory() {
        assert_eq!(
            run_check(compliance_operator, &FakeCluster::new(), &feed()).verdict,
            Verdict::Advisory
        );
    }

    #[test]
    fn registry_sources() {
        let open = FakeCluster::new().with_object(
            &resource::IMAGE_CONFIG,
            json!({"metadata": {"name": "cluster"}, "spec": {}}),
        );
        assert_eq!(run_check(allowed_registries, &open, &feed()).verdict, Verdict::Advisory);

        let restricted = FakeCluster::new().with_object(
            &resource::IMAGE_CONFIG,
            json!({"metadata": {"name": "cluster"}, "spec": {"registrySources": {"allowedRegistries": ["quay.io"]}}}),
        );
        let result = run_check(allowed_registries, &restricted, &feed());
        assert_eq!(result.verdict, Verdict::NoChange);
        assert!(result.observation.contains("quay.io"));
    }
}
