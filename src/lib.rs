pub mod access;
pub mod auth;
pub mod cli;
pub mod cohort;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod predicate;
pub mod query;
pub mod server;
pub mod types;
