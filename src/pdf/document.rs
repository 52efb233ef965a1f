use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
    /// The trailer carried an `Encrypt` entry that was dropped on load
    pub encryption_ignored: bool,
}

impl PdfDocument {
    /// Load a PDF, ignoring a nominal encryption dictionary.
    ///
    /// No decryption is attempted: the `Encrypt` entry is removed from the
    /// trailer so the document can be copied and re-saved as plain objects.
    /// A document whose page tree stays locked behind its encryption is an
    /// error, not an empty document.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read PDF: {}", path_str))?;
        let mut doc = Document::load_mem(&bytes)
            .with_context(|| format!("Failed to open PDF: {}", path_str))?;

        let encryption_ignored = doc.trailer.remove(b"Encrypt").is_some();
        if encryption_ignored && (page_tree_root(&doc).is_err() || doc.get_pages().is_empty()) {
            anyhow::bail!(
                "Failed to open PDF: {}: encrypted content could not be read",
                path_str
            );
        }

        Ok(PdfDocument {
            doc,
            path: path_str,
            encryption_ignored,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Copy a single page (1-indexed) into a new, independent document.
    ///
    /// The whole object graph is cloned, every other page is deleted and
    /// objects no longer reachable from the trailer are dropped.
    pub fn extract_page(&self, page: u32) -> Result<Document> {
        let all_pages = self.page_ids();
        let total = all_pages.len() as u32;

        if page == 0 || page > total {
            anyhow::bail!(
                "Page {} is out of range (1-{}) in {}",
                page,
                total,
                self.path
            );
        }

        let pages_to_delete: Vec<u32> = all_pages
            .iter()
            .map(|(num, _)| *num)
            .filter(|num| *num != page)
            .collect();

        let mut new_doc = self.doc.clone();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
            if let Ok(root) = page_tree_root(&new_doc) {
                recount_page_tree(&mut new_doc, root, 0);
            }
        }
        new_doc.prune_objects();

        Ok(new_doc)
    }

    /// Serialize into one buffer and write it with a single call
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .with_context(|| format!("Failed to serialize PDF: {}", path.display()))?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to save PDF: {}", path.display()))?;
        Ok(())
    }
}

/// Object id of the root `Pages` node
pub fn page_tree_root(doc: &Document) -> Result<ObjectId> {
    let catalog = doc.catalog().context("Failed to get document catalog")?;
    catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .context("Catalog has no Pages reference")
}

/// Rewrite `Count` on every `Pages` node below `node` to match its kids.
///
/// `delete_pages` unlinks pages from `Kids` but leaves the counts alone.
fn recount_page_tree(doc: &mut Document, node: ObjectId, depth: usize) -> i64 {
    // malformed trees can loop back on themselves
    if depth > 64 {
        return 0;
    }

    let kids: Vec<ObjectId> = match doc.get_dictionary(node) {
        Ok(dict) => match dict.get(b"Kids") {
            Ok(Object::Array(kids)) => kids
                .iter()
                .filter_map(|kid| kid.as_reference().ok())
                .collect(),
            _ => return 1,
        },
        Err(_) => return 0,
    };

    let count: i64 = kids
        .into_iter()
        .map(|kid| recount_page_tree(doc, kid, depth + 1))
        .sum();

    if let Ok(dict) = doc.get_dictionary_mut(node) {
        dict.set("Count", Object::Integer(count));
    }
    count
}
