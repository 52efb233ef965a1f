pub mod classify;
pub mod merge;
pub mod report;
pub mod split;
pub mod walker;

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::InvocationError;
use report::{Journal, UnitOutcome};
pub use report::RunReport;
use walker::Visitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Split,
    Merge,
}

impl FromStr for Operation {
    type Err = InvocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "split" => Ok(Operation::Split),
            "merge" => Ok(Operation::Merge),
            _ => Err(InvocationError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Split => write!(f, "split"),
            Operation::Merge => write!(f, "merge"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stamp running page numbers on merged output
    pub number_pages: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions { number_pages: true }
    }
}

/// Validate a root path and an optional operation name coming from a shell
pub fn parse_invocation(
    path: Option<&str>,
    operation: Option<&str>,
) -> Result<(PathBuf, Operation), InvocationError> {
    let operation = parse_operation(operation)?;
    Ok((parse_root(path)?, operation))
}

/// A missing or blank operation means split
pub fn parse_operation(operation: Option<&str>) -> Result<Operation, InvocationError> {
    match operation.map(str::trim) {
        Some(op) if !op.is_empty() => op.parse(),
        _ => Ok(Operation::default()),
    }
}

pub fn parse_root(path: Option<&str>) -> Result<PathBuf, InvocationError> {
    match path.map(str::trim) {
        Some(p) if !p.is_empty() => check_root(Path::new(p)),
        _ => Err(InvocationError::MissingRootPath),
    }
}

/// Resolve `root` to an existing directory
pub fn check_root(root: &Path) -> Result<PathBuf, InvocationError> {
    if root.as_os_str().is_empty() {
        return Err(InvocationError::MissingRootPath);
    }

    let resolved = std::fs::canonicalize(root).map_err(|source| match source.kind() {
        ErrorKind::NotFound => InvocationError::RootNotFound(root.to_path_buf()),
        _ => InvocationError::RootInaccessible {
            path: root.to_path_buf(),
            source,
        },
    })?;

    if !resolved.is_dir() {
        return Err(InvocationError::NotADirectory(root.to_path_buf()));
    }
    Ok(resolved)
}

pub fn run(
    root: &Path,
    operation: Operation,
    options: &RunOptions,
) -> Result<RunReport, InvocationError> {
    run_with_progress(root, operation, options, |_| {})
}

/// Like [`run`], calling `on_message` with every log line as it is produced
pub fn run_with_progress<'a>(
    root: &Path,
    operation: Operation,
    options: &RunOptions,
    on_message: impl FnMut(&str) + 'a,
) -> Result<RunReport, InvocationError> {
    let root = check_root(root)?;
    let started = Instant::now();

    let mut journal = Journal::with_listener(on_message);
    journal.info(format!("Starting {} in {}", operation, root.display()));

    let mut runner = UnitRunner {
        operation,
        options,
        journal: &mut journal,
        outcomes: Vec::new(),
    };
    walker::walk(&root, &mut runner);
    let outcomes = runner.outcomes;

    journal.info("All PDFs processed");

    let report = RunReport::fold(&outcomes, journal.into_messages(), started.elapsed());
    info!(
        operation = %operation,
        processed = report.processed_count,
        generated = report.generated_count,
        elapsed_seconds = report.elapsed_seconds,
        "run finished"
    );
    Ok(report)
}

struct UnitRunner<'r, 'j> {
    operation: Operation,
    options: &'r RunOptions,
    journal: &'r mut Journal<'j>,
    outcomes: Vec<UnitOutcome>,
}

impl UnitRunner<'_, '_> {
    fn failed(&mut self, path: &Path, err: anyhow::Error) -> UnitOutcome {
        self.journal
            .error(format!("Error processing {}: {:#}", path.display(), err));
        UnitOutcome::Failed {
            path: path.to_path_buf(),
        }
    }
}

impl Visitor for UnitRunner<'_, '_> {
    fn on_file(&mut self, path: &Path) {
        if self.operation != Operation::Split {
            return;
        }

        let outcome = match split::split_file(path, self.journal) {
            Ok(pages_written) => UnitOutcome::Split {
                source: path.to_path_buf(),
                pages_written,
            },
            Err(err) => self.failed(path, err),
        };
        self.outcomes.push(outcome);
    }

    fn on_directory(&mut self, dir: &Path, pdfs: &[PathBuf]) {
        if self.operation != Operation::Merge || pdfs.is_empty() {
            return;
        }

        let outcome = match merge::merge_directory(dir, pdfs, self.options, self.journal) {
            Ok(summary) => UnitOutcome::Merged {
                directory: dir.to_path_buf(),
                inputs_merged: summary.inputs_merged,
                pages_combined: summary.pages_combined,
                output: summary.output,
            },
            Err(err) => self.failed(dir, err),
        };
        self.outcomes.push(outcome);
    }

    fn on_error(&mut self, path: Option<&Path>, message: &str) {
        match path {
            Some(path) => self
                .journal
                .error(format!("Error reading {}: {}", path.display(), message)),
            None => self.journal.error(format!("Error reading directory tree: {}", message)),
        }
    }
}
