use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::classify::{classify, EntryKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// A PDF file, at any depth
    File(PathBuf),
    /// A directory whose descendants have all been reported, with the PDF
    /// files directly inside it in discovery order
    Directory { path: PathBuf, pdfs: Vec<PathBuf> },
    /// An entry that could not be read
    Error {
        path: Option<PathBuf>,
        message: String,
    },
}

pub trait Visitor {
    fn on_file(&mut self, _path: &Path) {}

    fn on_directory(&mut self, _dir: &Path, _pdfs: &[PathBuf]) {}

    fn on_error(&mut self, _path: Option<&Path>, _message: &str) {}
}

/// Enumerate `root` into the sequence of visits the walker will replay.
///
/// Entries come in directory read order; a directory is reported only after
/// everything below it, and the root is reported last. Symlinks are followed
/// and unreadable entries become `Visit::Error` without stopping the walk.
pub fn collect(root: &Path) -> Vec<Visit> {
    let mut visits = Vec::new();
    let mut pending: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();

    for entry in WalkDir::new(root).follow_links(true).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let message = err
                    .io_error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| err.to_string());
                visits.push(Visit::Error {
                    path: err.path().map(Path::to_path_buf),
                    message,
                });
                continue;
            }
        };

        let path = entry.path();
        match classify(path, entry.file_type().is_dir()) {
            EntryKind::Directory => {
                let pdfs = pending.remove(path).unwrap_or_default();
                visits.push(Visit::Directory {
                    path: path.to_path_buf(),
                    pdfs,
                });
            }
            EntryKind::PdfFile => {
                if let Some(parent) = path.parent() {
                    pending
                        .entry(parent.to_path_buf())
                        .or_default()
                        .push(path.to_path_buf());
                }
                visits.push(Visit::File(path.to_path_buf()));
            }
            EntryKind::Ignored => {
                debug!(path = %path.display(), "ignoring non-PDF entry");
            }
        }
    }

    visits
}

/// Walk `root` and hand every visit to `visitor`.
///
/// The tree is enumerated up front, so files the visitor writes are not visited.
pub fn walk<V: Visitor>(root: &Path, visitor: &mut V) {
    for visit in collect(root) {
        match visit {
            Visit::File(path) => visitor.on_file(&path),
            Visit::Directory { path, pdfs } => visitor.on_directory(&path, &pdfs),
            Visit::Error { path, message } => visitor.on_error(path.as_deref(), &message),
        }
    }
}
