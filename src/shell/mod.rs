//! External command execution and environment detection.

pub mod command;
pub mod platform;

pub use command::{display_command, run, CommandOutput};
pub use platform::is_ci;
