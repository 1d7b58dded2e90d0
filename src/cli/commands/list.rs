//! List command implementation.
//!
//! The `ocaudit list` command prints every check in execution order,
//! grouped by category.

use serde::Serialize;

use crate::checks::{registry, Category, CheckEntry};
use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    args: ListArgs,
}

#[derive(Debug, Serialize)]
struct ListedCheck {
    name: &'static str,
    title: &'static str,
    category: Category,
    references: &'static [&'static str],
}

impl From<&CheckEntry> for ListedCheck {
    fn from(entry: &CheckEntry) -> Self {
        Self {
            name: entry.name,
            title: entry.title,
            category: entry.category,
            references: entry.references,
        }
    }
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(args: ListArgs) -> Self {
        Self { args }
    }

    fn json(&self, entries: &[CheckEntry]) -> Result<String> {
        let listed: Vec<ListedCheck> = entries.iter().map(ListedCheck::from).collect();
        Ok(serde_json::to_string_pretty(&listed).map_err(anyhow::Error::from)?)
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let entries = registry();

        if self.args.json {
            println!("{}", self.json(&entries)?);
            return Ok(CommandResult::success());
        }

        let mut current = None;
        for entry in &entries {
            if current != Some(entry.category) {
                ui.show_header(entry.category.label());
                current = Some(entry.category);
            }
            ui.message(&format!("  {:<28} {}", entry.name, entry.title));
        }
        ui.message(&format!("\n{} checks", entries.len()));

        Ok(CommandResult::success())
    }
}
