use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::report::Journal;

/// Name of the file holding page `page_num` (1-based) of `stem`
pub fn output_name(stem: &str, page_num: u32) -> String {
    format!("{}_pagina{}.pdf", stem, page_num)
}

/// Split one PDF into single-page PDFs written next to it.
///
/// Documents with at most one page are left alone. Returns the number of
/// files written.
pub fn split_file(input: &Path, journal: &mut Journal) -> Result<usize> {
    journal.info(format!("Processing: {}", input.display()));

    let doc = PdfDocument::open(input)?;
    if doc.encryption_ignored {
        journal.info(format!("Ignoring encryption of {}", input.display()));
    }

    let total_pages = doc.page_count();
    if total_pages <= 1 {
        journal.info(format!(
            "Skipping PDF with {} page(s): {}",
            total_pages,
            input.display()
        ));
        return Ok(0);
    }

    let output_dir = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());

    for page_num in 1..=total_pages {
        let output_path: PathBuf = output_dir.join(output_name(&stem, page_num));

        let mut new_doc = doc.extract_page(page_num)?;
        PdfDocument::save(&mut new_doc, &output_path)?;

        journal.info(format!(
            "Page {} of {} saved to: {}",
            page_num,
            input.display(),
            output_path.display()
        ));
    }

    Ok(total_pages as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    #[test]
    fn test_output_name_is_one_based_and_unpadded() {
        assert_eq!(output_name("report", 1), "report_pagina1.pdf");
        assert_eq!(output_name("report", 12), "report_pagina12.pdf");
    }

    #[test]
    fn test_split_writes_one_file_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixtures::write_pdf(dir.path(), "a.pdf", 3, "a");

        let mut journal = Journal::new();
        let written = split_file(&input, &mut journal).unwrap();
        assert_eq!(written, 3);

        for page in 1..=3 {
            let output = dir.path().join(format!("a_pagina{}.pdf", page));
            assert_eq!(fixtures::page_count(&output), 1);
            let texts = fixtures::page_texts(&output);
            assert!(texts[0].contains(&format!("a-Page-{}", page)));
        }
        assert!(!dir.path().join("a_pagina4.pdf").exists());

        // source stays where it was, unchanged
        assert_eq!(fixtures::page_count(&input), 3);
    }

    #[test]
    fn test_split_keeps_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixtures::write_pdf_sized(dir.path(), "a4.pdf", 2, "a4", fixtures::A4);

        let mut journal = Journal::new();
        split_file(&input, &mut journal).unwrap();

        let output = dir.path().join("a4_pagina2.pdf");
        let doc = lopdf::Document::load(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        assert_eq!(crate::pdf::stamp::page_box(&doc, page_id), [0.0, 0.0, 595.0, 842.0]);
    }

    #[test]
    fn test_single_page_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixtures::write_pdf(dir.path(), "one.pdf", 1, "one");

        let mut journal = Journal::new();
        assert_eq!(split_file(&input, &mut journal).unwrap(), 0);
        assert!(!dir.path().join("one_pagina1.pdf").exists());
        assert!(journal.messages().iter().any(|m| m.starts_with("Skipping")));
    }

    #[test]
    fn test_empty_document_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixtures::write_pdf(dir.path(), "empty.pdf", 0, "empty");

        let mut journal = Journal::new();
        assert_eq!(split_file(&input, &mut journal).unwrap(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"not a pdf at all").unwrap();

        let mut journal = Journal::new();
        let err = split_file(&input, &mut journal).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.pdf"));
        assert!(!dir.path().join("broken_pagina1.pdf").exists());
    }
}
