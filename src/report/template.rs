//! Report templates.
//!
//! The default template is embedded in the binary. A custom template can be
//! supplied with `--template` or the `template` config key; it must carry the
//! same markers.

use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};

use crate::error::{AuditError, Result};

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// File name of the built-in report template.
pub const DEFAULT_TEMPLATE: &str = "health-check.adoc";

/// The built-in template.
pub fn builtin() -> Result<&'static str> {
    let file = TEMPLATES_DIR
        .get_file(DEFAULT_TEMPLATE)
        .ok_or_else(|| AuditError::Template {
            message: format!("built-in template {} is missing", DEFAULT_TEMPLATE),
        })?;

    file.contents_utf8().ok_or_else(|| AuditError::Template {
        message: format!("built-in template {} is not valid UTF-8", DEFAULT_TEMPLATE),
    })
}

/// Load a custom template from disk, or the built-in one.
pub fn load(custom: Option<&Path>) -> Result<String> {
    match custom {
        Some(path) => fs::read_to_string(path).map_err(|e| AuditError::Template {
            message: format!("cannot read template {}: {}", path.display(), e),
        }),
        None => builtin().map(String::from),
    }
}
