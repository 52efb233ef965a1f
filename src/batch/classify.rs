use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    PdfFile,
    Ignored,
}

/// Decide what a directory entry is to the batch run
pub fn classify(path: &Path, is_dir: bool) -> EntryKind {
    if is_dir {
        EntryKind::Directory
    } else if is_pdf(path) {
        EntryKind::PdfFile
    } else {
        EntryKind::Ignored
    }
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
