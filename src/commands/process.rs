use crate::batch::{self, RunOptions};
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, operation: &str, options: &RunOptions) -> Result<()> {
    let operation = batch::parse_operation(Some(operation))?;
    let report = batch::run_with_progress(path.as_ref(), operation, options, |line: &str| {
        println!("{}", line)
    })?;

    println!();
    println!("Processed PDF files: {}", report.processed_count);
    println!("Generated PDF files: {}", report.generated_count);
    println!("Elapsed: {:.2}s", report.elapsed_seconds);

    Ok(())
}
