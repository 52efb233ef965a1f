use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes that may be inherited from ancestor `Pages` nodes
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

pub struct PageAssembler {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PageAssembler {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        PageAssembler {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Mutable access to the document being built, e.g. to decorate pages
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Append every page of `source`, in order.
    ///
    /// Returns the ids of the appended pages inside the assembled document.
    pub fn append(&mut self, mut source: Document) -> Result<Vec<ObjectId>> {
        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();

        // Pages are about to lose their original parents, so anything they
        // inherit has to be copied onto the page itself first.
        for &page_id in &source_pages {
            materialize_inherited(&mut source, page_id)?;
        }

        let id_offset = self.doc.max_id;
        let source_max_id = source.max_id;

        for (old_id, object) in std::mem::take(&mut source.objects) {
            let new_id = (old_id.0 + id_offset, old_id.1);
            self.doc
                .objects
                .insert(new_id, remap_object_refs(object, id_offset));
        }
        self.doc.max_id = self.doc.max_id.max(source_max_id + id_offset);

        let mut appended = Vec::with_capacity(source_pages.len());
        for old_page_id in source_pages {
            let new_page_id = (old_page_id.0 + id_offset, old_page_id.1);
            self.doc
                .get_dictionary_mut(new_page_id)
                .context("Imported page is not a dictionary")?
                .set("Parent", Object::Reference(self.pages_id));
            self.kids.push(new_page_id);
            appended.push(new_page_id);
        }

        Ok(appended)
    }

    /// Build the page tree and catalog and drop unreachable objects
    pub fn finish(mut self) -> Document {
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(self.kids.len() as i64)),
            (
                "Kids",
                Object::Array(self.kids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.doc.prune_objects();
        self.doc
    }
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up `key` on a page, falling back to its ancestors
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let inherited: Vec<(&[u8], Object)> = INHERITABLE
        .iter()
        .filter_map(|key| inherited_attribute(doc, page_id, key).map(|value| (*key, value)))
        .collect();

    let page = doc
        .get_dictionary_mut(page_id)
        .context("Page object is not a dictionary")?;
    for (key, value) in inherited {
        if !page.has(key) {
            page.set(key.to_vec(), value);
        }
    }
    Ok(())
}

/// Recursively shift object references by `offset`
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            remap_dictionary(&mut dict, offset);
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            remap_dictionary(&mut stream.dict, offset);
            Object::Stream(stream)
        }
        other => other,
    }
}

fn remap_dictionary(dict: &mut Dictionary, offset: u32) {
    for (_, value) in dict.iter_mut() {
        *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
    }
}
