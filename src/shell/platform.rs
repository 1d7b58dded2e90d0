//! Execution environment detection.

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
        || std::env::var("TEKTON_PIPELINE").is_ok()
        || std::env::var("OPENSHIFT_BUILD_NAME").is_ok()
}
