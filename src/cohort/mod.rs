pub mod catalog;
pub mod cohort_filter;
pub mod error;

pub use catalog::{DimensionCatalog, DimensionKind, DimensionSpec, FlagSpec, FlagTest, ValueRule};
pub use cohort_filter::CohortFilter;
pub use error::CohortError;
