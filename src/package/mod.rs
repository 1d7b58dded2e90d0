//! Password-protected packaging of the report directory.
//!
//! The output directory is written into a zip archive with every entry
//! AES-256 encrypted under one randomly generated password. After writing,
//! the archive is reopened and every entry decrypted to confirm it.

mod archive;
mod password;

pub use archive::{archive_directory, collect_files, digest, verify_archive, ArchiveReport};
pub use password::{generate_password, PASSWORD_BYTES};
