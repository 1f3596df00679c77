use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrantError {
    #[error("Role must be a JSON object: {0}")]
    NotAnObject(String),

    #[error("Role carries no constraints")]
    NoConstraints,

    #[error("Role key has no dataset prefix: {0}")]
    MissingDatasetPrefix(String),

    #[error("Role mixes datasets '{0}' and '{1}'")]
    MixedDatasets(String, String),

    #[error("Invalid dataset name: {0}")]
    InvalidDataset(String),

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Constraint value for '{0}' must be a string or number")]
    InvalidValue(String),

    #[error("Constraint with value '{0}' has no field to compare against")]
    MissingField(String),
}
