pub mod columns;
pub mod manager;
pub mod models;
pub mod partial_update;
pub mod query_builder;
pub mod repository;

pub use manager::DatabaseError;
