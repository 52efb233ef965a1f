pub mod assemble;
pub mod document;
pub mod stamp;

#[cfg(test)]
pub mod fixtures;

pub use document::PdfDocument;
