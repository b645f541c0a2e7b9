pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod schema;

pub use manager::{Database, DatabaseError};
pub use query_builder::SqlParam;
