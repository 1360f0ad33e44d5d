//! PostgreSQL persistence for the garden records: schema migrations,
//! connection config, row models and query functions.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
