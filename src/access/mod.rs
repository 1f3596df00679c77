pub mod error;
pub mod role;
pub mod grant_filter;

pub use error::GrantError;
pub use role::{GrantedRole, RoleConstraint};
pub use grant_filter::GrantFilter;
