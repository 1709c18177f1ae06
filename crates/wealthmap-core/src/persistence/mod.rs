//! SQLite persistence for properties and bookmarks

mod repository;
mod schema;

pub use repository::{PropertyPage, Repository};
pub use schema::{Schema, SCHEMA_VERSION};
