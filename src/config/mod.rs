//! Configuration loading.
//!
//! ocaudit reads an optional YAML file (`ocaudit.yml`) for values that are
//! tedious to pass on every run: customer name, output location, transport
//! and check thresholds. Command-line flags always win.

pub mod loader;
pub mod schema;

pub use loader::{discover, load, load_config_file, PROJECT_CONFIG};
pub use schema::{AuditConfig, AuditSettings, Thresholds};
