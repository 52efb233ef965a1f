use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::assemble::inherited_attribute;

/// Distance of the text origin from the right edge of the page
pub const RIGHT_OFFSET: f32 = 50.0;
/// Distance of the text origin from the top edge of the page
pub const TOP_OFFSET: f32 = 30.0;
pub const FONT_SIZE: i64 = 10;

const FONT_RESOURCE: &[u8] = b"FPageNumber";
const LETTER_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Text drawn on the `number`-th page (1-based)
pub fn page_label(number: u32) -> String {
    format!("{:03}", number)
}

/// Stamps consecutive page numbers onto pages of one document
pub struct PageNumberStamper {
    font_id: Option<ObjectId>,
}

impl PageNumberStamper {
    pub fn new() -> Self {
        PageNumberStamper { font_id: None }
    }

    /// Draw `page_label(number)` in the top-right corner of `page_id`.
    ///
    /// The existing content is wrapped in `q`/`Q` ahead of the overlay stream.
    pub fn stamp(&mut self, doc: &mut Document, page_id: ObjectId, number: u32) -> Result<()> {
        let font_id = self.font(doc);
        let [_, _, right, top] = page_box(doc, page_id);
        let x = right - RIGHT_OFFSET;
        let y = top - TOP_OFFSET;

        let resources = page_resources_with_font(doc, page_id, font_id)?;

        let save_state = doc.add_object(Stream::new(
            Dictionary::new(),
            Content {
                operations: vec![Operation::new("q", vec![])],
            }
            .encode()?,
        ));

        let overlay = Content {
            operations: vec![
                Operation::new("Q", vec![]),
                Operation::new("q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(FONT_RESOURCE.to_vec()),
                        Object::Integer(FONT_SIZE),
                    ],
                ),
                Operation::new("g", vec![Object::Integer(0)]),
                Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        page_label(number).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        // streams are concatenated as-is, keep the first operator separate
        let mut overlay_bytes = b"\n".to_vec();
        overlay_bytes.extend(overlay.encode()?);
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay_bytes));

        let page = doc
            .get_dictionary_mut(page_id)
            .context("Page object is not a dictionary")?;

        let mut contents = vec![Object::Reference(save_state)];
        match page.get(b"Contents") {
            Ok(Object::Array(existing)) => contents.extend(existing.iter().cloned()),
            Ok(existing @ Object::Reference(_)) => contents.push(existing.clone()),
            _ => {}
        }
        contents.push(Object::Reference(overlay_id));

        page.set("Contents", Object::Array(contents));
        page.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn font(&mut self, doc: &mut Document) -> ObjectId {
        *self.font_id.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            })
        })
    }
}

impl Default for PageNumberStamper {
    fn default() -> Self {
        Self::new()
    }
}

/// Page rectangle `[llx, lly, urx, ury]`, US Letter when none is declared
pub fn page_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let declared = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| match obj {
            Object::Array(values) if values.len() == 4 => {
                let numbers: Vec<f32> = values.iter().filter_map(number).collect();
                <[f32; 4]>::try_from(numbers).ok()
            }
            _ => None,
        });

    match declared {
        Some([x0, y0, x1, y1]) => [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)],
        None => LETTER_BOX,
    }
}

/// Inline copy of the page's resources with the stamp font registered.
/// Shared resource objects are left untouched.
fn page_resources_with_font(
    doc: &Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<Dictionary> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources")
        .and_then(|obj| resolve(doc, obj))
    {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font").ok().cloned().and_then(|obj| resolve(doc, obj)) {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };
    fonts.set(FONT_RESOURCE.to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    Ok(resources)
}

fn resolve(doc: &Document, obj: Object) -> Option<Object> {
    match obj {
        Object::Reference(id) => doc.get_object(id).ok().cloned(),
        other => Some(other),
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
