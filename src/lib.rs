//! ocaudit - OpenShift cluster health check report generator.
//!
//! ocaudit inspects a running OpenShift cluster against a fixed catalogue of
//! best-practice checks, renders every verdict into an AsciiDoc report and
//! packages the report directory into a password-protected archive.
//!
//! # Modules
//!
//! - [`checks`] - The check catalogue and its registry
//! - [`cli`] - Command-line interface and argument parsing
//! - [`cluster`] - Read-only cluster access (`oc` or REST) and kubeconfig handling
//! - [`config`] - Configuration file loading
//! - [`error`] - Error types and result aliases
//! - [`package`] - Encrypted zip archive of the report directory
//! - [`releases`] - Release versions and the public release feed
//! - [`report`] - Report template and in-place substitution
//! - [`runner`] - Sequential check execution
//! - [`shell`] - External command execution
//! - [`ui`] - Progress bar and terminal output
//!
//! # Example
//!
//! ```
//! use ocaudit::releases::compare;
//! use std::cmp::Ordering;
//!
//! assert_eq!(compare("4.11.0", "4.12.0").unwrap(), Ordering::Less);
//! assert!(compare("4.12", "4.12.0").is_err());
//! ```

pub mod checks;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod package;
pub mod releases;
pub mod report;
pub mod runner;
pub mod shell;
pub mod ui;

pub use error::{AuditError, Result};
