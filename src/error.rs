use thiserror::Error;

#[derive(Error, Debug)]
pub enum TicketError {
    #[error("Enter a title for the entry.")]
    EmptyTitle,

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Invalid entry state: {0}")]
    InvalidState(String),

    #[error("Invalid sort column: {0}")]
    InvalidColumn(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Could not determine a data directory. Pass --data-dir or set TICKETLOG_DIR.")]
    DataDirNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, TicketError>;
