pub mod executor;
pub mod manager;

pub use executor::{PgExecutor, QueryExecutor};
pub use manager::{DatabaseError, DatabaseManager};
