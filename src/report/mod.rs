//! AsciiDoc report generation.

pub mod document;
pub mod render;
pub mod template;

pub use document::ReportDocument;
pub use render::{heading_marker, summary_marker, Substitution};
pub use template::{builtin, load as load_template, DEFAULT_TEMPLATE};
