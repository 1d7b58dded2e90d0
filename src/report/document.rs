//! The in-memory report.

use std::fs;
use std::path::Path;

use crate::error::{AuditError, Result};
use crate::report::render::Substitution;

/// Report text as an ordered list of lines.
///
/// Seeded from a template, rewritten by each check's substitution in turn,
/// and written to disk once at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    lines: Vec<String>,
}

impl ReportDocument {
    /// Seed a document from template text.
    pub fn from_template(template: &str) -> Self {
        Self {
            lines: template.lines().map(String::from).collect(),
        }
    }

    /// Replace the value of a header attribute (`:name: value`).
    ///
    /// Returns `false` when the template does not declare the attribute.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        let prefix = format!(":{}:", name);
        match self.lines.iter_mut().find(|l| l.starts_with(&prefix)) {
            Some(line) => {
                *line = format!("{} {}", prefix, value);
                true
            }
            None => false,
        }
    }

    /// Run every line through a check's substitution.
    pub fn apply(&mut self, substitution: &Substitution) {
        let rendered: String = self
            .lines
            .iter()
            .map(|line| substitution.render_line(line))
            .collect();
        self.lines = rendered.lines().map(String::from).collect();
    }

    /// Number of lines starting with `marker`.
    pub fn count_marker(&self, marker: &str) -> usize {
        self.lines.iter().filter(|l| l.starts_with(marker)).count()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full text with a trailing newline.
    pub fn contents(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Write the document, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AuditError::Template {
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        fs::write(path, self.contents()).map_err(|e| AuditError::Template {
            message: format!("cannot write {}: {}", path.display(), e),
        })?;

        tracing::debug!("wrote report to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{find, CheckResult};
    use tempfile::TempDir;

    const TEMPLATE: &str = "= Report\n:customer: Customer\n:cluster: cluster\n\n\
        |\n<<Node Status>>\n\n== Node Status\n";

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut doc = ReportDocument::from_template(TEMPLATE);
        assert!(doc.set_attribute("customer", "Acme"));
        assert!(!doc.set_attribute("missing", "x"));
        assert_eq!(doc.lines()[1], ":customer: Acme");
        assert_eq!(doc.lines()[2], ":cluster: cluster");
    }

    #[test]
    fn apply_expands_both_markers() {
        let entry = find("node-status").unwrap();
        let result = CheckResult::no_change("All 6 nodes are ready and schedulable.");
        let mut doc = ReportDocument::from_template(TEMPLATE);

        doc.apply(&Substitution::new(&entry, &result));

        assert_eq!(doc.count_marker("|{set:cellbgcolor:#00FF00}"), 2);
        assert!(doc.contents().contains("All 6 nodes are ready"));
        assert_eq!(doc.count_marker("<<Node Status>>"), 1);
    }

    #[test]
    fn applying_twice_appends_twice() {
        let entry = find("node-status").unwrap();
        let result = CheckResult::no_change("ok");
        let mut doc = ReportDocument::from_template(TEMPLATE);
        let sub = Substitution::new(&entry, &result);

        doc.apply(&sub);
        let once = doc.clone();
        doc.apply(&sub);

        assert_ne!(doc, once);
        assert_eq!(doc.count_marker("|{set:cellbgcolor:#00FF00}"), 4);
    }

    #[test]
    fn write_creates_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("report.adoc");

        ReportDocument::from_template(TEMPLATE).write(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), TEMPLATE);
    }
}
