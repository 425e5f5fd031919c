use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// Non-empty history exists for this run and clobbering is off
    #[error("History for run '{run_id}' already exists at {}", path.display())]
    HistoryExists { run_id: String, path: PathBuf },

    /// Reading or writing the history file failed
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded as JSON
    #[error("History record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
