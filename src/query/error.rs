use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssembleError {
    #[error("Insufficient permissions for dataset: {0}")]
    InsufficientPermissions(String),

    #[error("Cohort specification rejected for dataset: {0}")]
    CohortRejected(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}
