use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported content format version {found} (current is {current})")]
    UnsupportedVersion { found: u32, current: u32 },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
