use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate staff id '{id}' in roster")]
    DuplicateStaffId { id: String },

    #[error("Roster row {row} has neither an id nor a name")]
    MissingStaffId { row: usize },

    #[error("Staff '{id}' not found in roster")]
    UnknownStaff { id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;
