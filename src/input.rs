//! Reading the input document stream
//!
//! Input comes from a file, from every `*.yaml`/`*.yml` file under a
//! directory, or from standard input. Directory scans skip hidden entries and
//! visit files in file-name order so the stream is deterministic.

use glob::Pattern;
use log::debug;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::codec::DOCUMENT_SEPARATOR;
use crate::error::{Error, Result};

/// File name patterns picked up by a directory scan.
pub const MANIFEST_PATTERNS: &[&str] = &["*.yaml", "*.yml"];

/// Read the input stream.
///
/// An explicit `path` wins. Otherwise piped standard input is read, and when
/// standard input is a terminal the current directory is scanned.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        return load_from_path(path);
    }
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        debug!("Reading documents from standard input");
        let mut text = String::new();
        stdin.lock().read_to_string(&mut text)?;
        return Ok(text);
    }
    load_from_path(Path::new("."))
}

/// Read one manifest file, or every manifest under a directory.
pub fn load_from_path(path: &Path) -> Result<String> {
    if path.is_file() {
        debug!("Reading documents from {}", path.display());
        return Ok(std::fs::read_to_string(path)?);
    }
    if !path.is_dir() {
        return Err(Error::Input {
            message: format!("{} does not exist", path.display()),
        });
    }

    let files = manifest_files(path)?;
    if files.is_empty() {
        return Err(Error::Input {
            message: format!("no *.yaml or *.yml files found under {}", path.display()),
        });
    }

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        debug!("Reading documents from {}", file.display());
        parts.push(std::fs::read_to_string(file)?);
    }
    Ok(parts.join(&format!("\n{}\n", DOCUMENT_SEPARATOR)))
}

/// Every manifest file under `dir`, in traversal order.
pub fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let patterns = MANIFEST_PATTERNS
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matched = entry
            .file_name()
            .to_str()
            .is_some_and(|name| patterns.iter().any(|p| p.matches(name)));
        if matched {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.starts_with('.'))
}
