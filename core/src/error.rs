use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Invalid filter criteria for '{field}': {reason}")]
    InvalidCriteria { field: String, reason: String },

    #[error("Malformed command: {reason}")]
    MalformedCommand { reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    pub fn invalid_criteria(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCriteria {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
