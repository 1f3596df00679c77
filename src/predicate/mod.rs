pub mod types;
pub mod params;
pub mod sql;

pub use types::{Predicate, SqlResult};
pub use params::ParamBinder;
