use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the cask catalog. None of these abort a run.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to run brew {args}: {source}")]
    Spawn { args: String, #[source] source: std::io::Error },
    #[error("brew {args} exited with {status}")]
    Status { args: String, status: std::process::ExitStatus },
}

/// Why a bundle could not be removed.
#[derive(Debug, Error)]
pub enum RemoveError {
    #[error("could not remove {}: {entry}", path.display())]
    Entry { path: PathBuf, entry: String, #[source] source: std::io::Error },
    #[error("privileged removal of {} failed: {reason}", path.display())]
    Privileged { path: PathBuf, reason: String },
}
