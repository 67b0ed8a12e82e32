use thiserror::Error;

#[derive(Error, Debug)]
pub enum TkError {
    #[error("{0}")]
    MalformedCommand(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0}")]
    EmptyDescription(String),

    #[error("Search keyword cannot be empty. Format: find KEYWORD")]
    EmptyKeyword,

    #[error("{0}")]
    InvalidIndex(String),

    #[error("{0}")]
    IndexOutOfRange(String),

    #[error("Invalid date: {0}")]
    DateFormat(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Storage error: {0}")]
    StorageIo(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TkError>;
