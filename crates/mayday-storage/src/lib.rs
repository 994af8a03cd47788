// Postgres storage layer with sqlx
//
// This crate provides durable implementations of the core SosStore trait:
// - Database: sqlx/Postgres repository with single-statement guarded updates
// - StorageBackend: enum dispatch between Postgres and the in-memory store

pub mod backend;
pub mod models;
pub mod repositories;

pub use backend::StorageBackend;
pub use models::SosEventRow;
pub use repositories::Database;
