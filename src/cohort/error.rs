use thiserror::Error;

#[derive(Error, Debug)]
pub enum CohortError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cohort specification must be a JSON object")]
    NotAnObject,

    #[error("Invalid payload for {dimension}: {reason}")]
    InvalidPayload { dimension: String, reason: String },

    #[error("Value not allowed for {dimension}: {value}")]
    ValueNotAllowed { dimension: String, value: String },

    #[error("Flag label cannot be mapped to a field: {0}")]
    InvalidFlagLabel(String),
}

impl CohortError {
    pub fn payload(dimension: &str, reason: impl Into<String>) -> Self {
        CohortError::InvalidPayload {
            dimension: dimension.to_string(),
            reason: reason.into(),
        }
    }
}
