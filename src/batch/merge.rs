use crate::pdf::assemble::PageAssembler;
use crate::pdf::stamp::PageNumberStamper;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};

use super::report::Journal;
use super::RunOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inputs_merged: usize,
    pub pages_combined: usize,
    pub output: Option<PathBuf>,
}

/// Name given to a directory when it has none (e.g. a filesystem root)
const FALLBACK_NAME: &str = "merged";

pub fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Name of the combined file for `dir_name` holding `total_pages` pages
pub fn output_name(dir_name: &str, total_pages: usize) -> String {
    format!("{}_{:03}.pdf", dir_name, total_pages)
}

/// Matches files produced by a previous merge of the directory `dir_name`
fn output_pattern(dir_name: &str) -> Result<Regex> {
    RegexBuilder::new(&format!(r"^{}_\d{{3,}}\.pdf$", regex::escape(dir_name)))
        .case_insensitive(true)
        .build()
        .context("Failed to build merge output pattern")
}

/// Merge the PDFs directly inside `dir` into `{dir_name}_{pages:03}.pdf`.
///
/// Inputs that fail to load are logged and left out; if none load, nothing
/// is written.
pub fn merge_directory(
    dir: &Path,
    inputs: &[PathBuf],
    options: &RunOptions,
    journal: &mut Journal,
) -> Result<MergeSummary> {
    if inputs.is_empty() {
        return Ok(MergeSummary::default());
    }

    let dir_name = directory_name(dir);
    let previous_output = output_pattern(&dir_name)?;

    let mut selected = Vec::with_capacity(inputs.len());
    for input in inputs {
        let is_previous_output = input
            .file_name()
            .is_some_and(|name| previous_output.is_match(&name.to_string_lossy()));
        if is_previous_output {
            journal.info(format!(
                "Skipping previous merge output: {}",
                input.display()
            ));
        } else {
            selected.push(input);
        }
    }

    if selected.is_empty() {
        return Ok(MergeSummary::default());
    }

    journal.info(format!(
        "Merging {} PDF(s) in {}",
        selected.len(),
        dir.display()
    ));

    let mut assembler = PageAssembler::new();
    let mut stamper = PageNumberStamper::new();
    let mut inputs_merged = 0;

    for input in selected {
        journal.info(format!("Processing: {}", input.display()));

        let doc = match PdfDocument::open(input) {
            Ok(doc) => doc,
            Err(err) => {
                journal.error(format!("Error processing {}: {:#}", input.display(), err));
                continue;
            }
        };
        if doc.encryption_ignored {
            journal.info(format!("Ignoring encryption of {}", input.display()));
        }

        let first_number = assembler.page_count() as u32 + 1;
        let appended = assembler
            .append(doc.doc)
            .with_context(|| format!("Failed to append pages of {}", input.display()))?;

        if options.number_pages {
            for (number, page_id) in (first_number..).zip(appended.iter().copied()) {
                stamper
                    .stamp(assembler.document_mut(), page_id, number)
                    .with_context(|| {
                        format!("Failed to number page {} from {}", number, input.display())
                    })?;
            }
        }

        inputs_merged += 1;
    }

    if inputs_merged == 0 {
        journal.error(format!(
            "No PDF in {} could be loaded, nothing merged",
            dir.display()
        ));
        return Ok(MergeSummary::default());
    }

    let pages_combined = assembler.page_count();
    if pages_combined == 0 {
        journal.info(format!(
            "PDFs in {} have no pages, nothing merged",
            dir.display()
        ));
        return Ok(MergeSummary::default());
    }

    let output_path = dir.join(output_name(&dir_name, pages_combined));

    let mut merged = assembler.finish();
    PdfDocument::save(&mut merged, &output_path)?;

    journal.info(format!(
        "Merged {} files ({} pages) into {}",
        inputs_merged,
        pages_combined,
        output_path.display()
    ));

    Ok(MergeSummary {
        inputs_merged,
        pages_combined,
        output: Some(output_path),
    })
}
