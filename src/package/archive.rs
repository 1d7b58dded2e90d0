//! Zip writing, verification and digest.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{AuditError, Result};

/// What ended up in a written archive.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub path: PathBuf,
    /// Entry names, relative to the archived directory.
    pub entries: Vec<String>,
}

fn archive_error(path: &Path, message: impl ToString) -> AuditError {
    AuditError::Archive {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// List every non-hidden regular file under `root`, sorted, skipping hidden
/// directories entirely. Symlinks are never followed or archived.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }
            let file_type = entry.file_type()?;
            if file_type.is_symlink() {
                debug!("Skipping symlink {}", path.display());
            } else if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn entry_name(root: &Path, file: &Path) -> Result<String> {
    let relative = file
        .strip_prefix(root)
        .map_err(|e| archive_error(file, e))?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Archive `source` into `dest`, encrypting every entry with `password`.
///
/// The file list is collected before the archive is created, so `dest` may
/// live inside `source` without archiving itself.
pub fn archive_directory(source: &Path, dest: &Path, password: &str) -> Result<ArchiveReport> {
    if !source.is_dir() {
        return Err(archive_error(source, "not a directory"));
    }

    let files = collect_files(source)?;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let out = File::create(dest).map_err(|e| archive_error(dest, e))?;
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .with_aes_encryption(AesMode::Aes256, password);

    let mut entries = Vec::with_capacity(files.len());
    for file in &files {
        let name = entry_name(source, file)?;
        debug!("archiving {}", name);

        zip.start_file(name.as_str(), options)
            .map_err(|e| archive_error(dest, e))?;
        let mut input = File::open(file)?;
        io::copy(&mut input, &mut zip)?;
        entries.push(name);
    }

    let mut out = zip.finish().map_err(|e| archive_error(dest, e))?;
    out.flush()?;

    Ok(ArchiveReport {
        path: dest.to_path_buf(),
        entries,
    })
}

/// Reopen `path` and decrypt every entry with `password`.
///
/// Returns the number of entries checked.
pub fn verify_archive(path: &Path, password: &str) -> Result<usize> {
    let file = File::open(path).map_err(|e| archive_error(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| archive_error(path, e))?;

    let mut buf = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index_decrypt(i, password.as_bytes())
            .map_err(|e| archive_error(path, e))?;
        if !entry.encrypted() {
            return Err(archive_error(path, format!("entry '{}' is not encrypted", entry.name())));
        }
        buf.clear();
        entry
            .read_to_end(&mut buf)
            .map_err(|e| archive_error(path, format!("entry '{}': {}", entry.name(), e)))?;
    }

    Ok(archive.len())
}

/// SHA-256 of a file, hex encoded.
pub fn digest(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        fs::write(root.join("health-check.adoc"), "= Report\n").unwrap();
        fs::write(root.join("results.json"), "{}").unwrap();
        fs::create_dir_all(root.join("extra")).unwrap();
        fs::write(root.join("extra/notes.txt"), "notes").unwrap();
        fs::write(root.join(".hidden"), "secret").unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
    }

    #[test]
    fn collects_visible_files_only() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let names: Vec<_> = collect_files(temp.path())
            .unwrap()
            .iter()
            .map(|p| entry_name(temp.path(), p).unwrap())
            .collect();

        assert_eq!(names, vec!["extra/notes.txt", "health-check.adoc", "results.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("out");
        fs::create_dir_all(source.join("extra")).unwrap();
        fs::write(source.join("health-check.adoc"), "= Report\n").unwrap();
        std::os::unix::fs::symlink(".", source.join("loop")).unwrap();
        std::os::unix::fs::symlink("../health-check.adoc", source.join("extra/link.adoc")).unwrap();

        let files = collect_files(&source).unwrap();
        assert_eq!(files, vec![source.join("health-check.adoc")]);

        let report = archive_directory(&source, &temp.path().join("report.zip"), "secret").unwrap();
        assert_eq!(report.entries, vec!["health-check.adoc"]);
    }

    #[test]
    fn archive_round_trip() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("out");
        fs::create_dir_all(&source).unwrap();
        populate(&source);
        let dest = temp.path().join("report.zip");

        let report = archive_directory(&source, &dest, "0123456789abcdef0123456789abcdef").unwrap();

        assert_eq!(report.entries.len(), 3);
        assert_eq!(verify_archive(&dest, "0123456789abcdef0123456789abcdef").unwrap(), 3);
    }

    #[test]
    fn wrong_password_fails_verification() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("out");
        fs::create_dir_all(&source).unwrap();
        populate(&source);
        let dest = temp.path().join("report.zip");

        archive_directory(&source, &dest, "right-password").unwrap();
        let err = verify_archive(&dest, "wrong-password").unwrap_err();
        assert!(matches!(err, AuditError::Archive { .. }));
    }

    #[test]
    fn archive_inside_source_is_not_included() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());
        let dest = temp.path().join("report.zip");

        let report = archive_directory(temp.path(), &dest, "pw").unwrap();
        assert!(!report.entries.iter().any(|e| e == "report.zip"));
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = archive_directory(&temp.path().join("nope"), &temp.path().join("a.zip"), "pw")
            .unwrap_err();
        assert!(matches!(err, AuditError::Archive { .. }));
    }

    #[test]
    fn digest_is_sha256_hex() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file");
        fs::write(&path, "abc").unwrap();

        assert_eq!(
            digest(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
