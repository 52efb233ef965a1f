use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("A root path is required")]
    MissingRootPath,

    #[error("Root path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Root path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Cannot access root path {}: {source}", .path.display())]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown operation: {0} (expected \"split\" or \"merge\")")]
    UnknownOperation(String),
}
