pub mod assembler;
pub mod dataset;
pub mod error;
pub mod limit;

pub use assembler::{AssembledQuery, QueryAssembler};
pub use dataset::Dataset;
pub use error::AssembleError;
pub use limit::{sanitise_limit, sanitise_limit_with, MAX_ROW_LIMIT};
