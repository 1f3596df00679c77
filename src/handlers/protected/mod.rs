// Protected handlers: a valid JWT is required and its roles decide which
// rows of a dataset the caller may read.
pub mod data;
pub mod find;
pub mod preview;
pub mod utils;

use serde::Deserialize;
use serde_json::Value;

/// JSON body accepted by the find and preview routes.
#[derive(Debug, Default, Deserialize)]
pub struct CohortRequest {
    /// Cohort specification as an object or as JSON text.
    #[serde(default)]
    pub cohort: Option<Value>,
    /// Row limit as a number or digit string.
    #[serde(default)]
    pub limit: Option<Value>,
}
