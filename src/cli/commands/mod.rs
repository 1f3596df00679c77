pub mod catalog;
pub mod cohort;
pub mod grant;
pub mod query;
pub mod token;
