use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one unit of work (one split file or one merged directory)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Split {
        source: PathBuf,
        pages_written: usize,
    },
    Merged {
        directory: PathBuf,
        inputs_merged: usize,
        pages_combined: usize,
        output: Option<PathBuf>,
    },
    Failed {
        path: PathBuf,
    },
}

/// Result of one run, as handed back to the shells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub processed_count: usize,
    pub generated_count: usize,
    pub elapsed_seconds: f64,
    pub messages: Vec<String>,
}

impl RunReport {
    pub fn fold(outcomes: &[UnitOutcome], messages: Vec<String>, elapsed: Duration) -> Self {
        let mut report = RunReport {
            elapsed_seconds: elapsed.as_secs_f64(),
            messages,
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                UnitOutcome::Split {
                    source,
                    pages_written,
                } => {
                    debug!(source = %source.display(), pages_written, "split unit");
                    report.processed_count += 1;
                    report.generated_count += pages_written;
                }
                UnitOutcome::Merged {
                    directory,
                    inputs_merged,
                    pages_combined,
                    output,
                } => {
                    debug!(
                        directory = %directory.display(),
                        inputs_merged,
                        pages_combined,
                        output = ?output,
                        "merge unit"
                    );
                    report.processed_count += inputs_merged;
                    if output.is_some() {
                        report.generated_count += 1;
                    }
                }
                UnitOutcome::Failed { path } => {
                    debug!(path = %path.display(), "failed unit");
                }
            }
        }

        report
    }
}

/// Ordered log of a run.
///
/// Every line is kept for the final report, emitted as a tracing event and
/// forwarded to the optional listener as soon as it is written.
pub struct Journal<'a> {
    messages: Vec<String>,
    listener: Option<Box<dyn FnMut(&str) + 'a>>,
}

impl<'a> Journal<'a> {
    pub fn new() -> Self {
        Journal {
            messages: Vec::new(),
            listener: None,
        }
    }

    pub fn with_listener(listener: impl FnMut(&str) + 'a) -> Self {
        Journal {
            messages: Vec::new(),
            listener: Some(Box::new(listener)),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.record(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.record(message);
    }

    #[cfg(test)]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    fn record(&mut self, message: String) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&message);
        }
        self.messages.push(message);
    }
}

impl Default for Journal<'_> {
    fn default() -> Self {
        Self::new()
    }
}
