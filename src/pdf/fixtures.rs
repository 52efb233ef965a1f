use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

pub const LETTER: (i64, i64) = (612, 792);
pub const A4: (i64, i64) = (595, 842);

/// Build a document with `num_pages` pages, each showing `{label}-Page-{n}`
pub fn document(num_pages: u32, label: &str, size: (i64, i64)) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();

    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{}-Page-{}", label, i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(size.0),
                    Object::Integer(size.1),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

pub fn bytes(num_pages: u32, label: &str, size: (i64, i64)) -> Vec<u8> {
    let mut doc = document(num_pages, label, size);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Write a letter-sized PDF into `dir` and return its path
pub fn write_pdf(dir: &Path, name: &str, num_pages: u32, label: &str) -> PathBuf {
    write_pdf_sized(dir, name, num_pages, label, LETTER)
}

pub fn write_pdf_sized(
    dir: &Path,
    name: &str,
    num_pages: u32,
    label: &str,
    size: (i64, i64),
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes(num_pages, label, size)).unwrap();
    path
}

/// Write a PDF whose trailer points at an `Encrypt` dictionary no reader can use
pub fn write_locked_pdf(dir: &Path, name: &str, num_pages: u32) -> PathBuf {
    let mut doc = document(num_pages, "locked", LETTER);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
    });
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));

    let path = dir.join(name);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    std::fs::write(&path, buffer).unwrap();
    path
}

/// Read a PDF back and return the decoded text of every page, in order
pub fn page_texts(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).to_string())
        .collect()
}

pub fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}
