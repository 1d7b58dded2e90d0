//! Error types for ocaudit operations.
//!
//! This module defines [`AuditError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Fatal conditions (kubeconfig, connectivity, configuration, output) abort
//!   the run and surface through the UI
//! - Per-check failures are logged by the runner and recorded as
//!   "to be evaluated" instead of aborting
//! - Use `anyhow::Error` (via `AuditError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ocaudit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// No kubeconfig at the resolved location.
    #[error("Kubeconfig not found: {path}")]
    KubeconfigNotFound { path: PathBuf },

    /// Kubeconfig exists but could not be parsed.
    #[error("Failed to parse kubeconfig at {path}: {message}")]
    KubeconfigParseError { path: PathBuf, message: String },

    /// The cluster API could not be reached with the current credentials.
    #[error("Cluster unreachable: {message}")]
    ClusterUnreachable { message: String },

    /// A queried resource does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    /// A cluster query failed for a reason other than a missing resource.
    #[error("Query for {resource} failed: {message}")]
    QueryFailed { resource: String, message: String },

    /// A resource was returned but lacks data a check depends on.
    #[error("Unexpected {resource} data: {message}")]
    UnexpectedData { resource: String, message: String },

    /// Version string is not of the form `major.minor.patch`.
    #[error("Invalid version '{version}': expected major.minor.patch")]
    InvalidVersion { version: String },

    /// Release feed could not be fetched or parsed.
    #[error("Release feed error for channel '{channel}': {message}")]
    ReleaseFeed { channel: String, message: String },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Report template could not be loaded.
    #[error("Template error: {message}")]
    Template { message: String },

    /// Archive creation or verification failed.
    #[error("Archive error for {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// External command could not be spawned.
    #[error("Could not run {command}: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AuditError {
    /// Whether this error means the queried object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Shorthand for an [`AuditError::UnexpectedData`] error.
    pub fn unexpected(resource: &str, message: impl Into<String>) -> Self {
        Self::UnexpectedData {
            resource: resource.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for ocaudit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kubeconfig_not_found_displays_path() {
        let err = AuditError::KubeconfigNotFound {
            path: PathBuf::from("/home/me/.kube/config"),
        };
        assert!(err.to_string().contains("/home/me/.kube/config"));
    }

    #[test]
    fn not_found_displays_kind_and_name() {
        let err = AuditError::NotFound {
            kind: "Secret".into(),
            name: "kubeadmin".into(),
        };
        assert_eq!(err.to_string(), "Secret 'kubeadmin' not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn query_failed_is_not_not_found() {
        let err = AuditError::QueryFailed {
            resource: "nodes".into(),
            message: "forbidden".into(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("forbidden"));
    }

    #[test]
    fn invalid_version_displays_input() {
        let err = AuditError::InvalidVersion {
            version: "4.12".into(),
        };
        assert!(err.to_string().contains("'4.12'"));
    }

    #[test]
    fn unexpected_builds_variant() {
        let err = AuditError::unexpected("ClusterVersion", "missing status.desired");
        assert!(matches!(err, AuditError::UnexpectedData { .. }));
        assert!(err.to_string().contains("missing status.desired"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: AuditError = io_err.into();
        assert!(matches!(err, AuditError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: AuditError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
