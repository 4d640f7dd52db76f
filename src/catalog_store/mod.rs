//! Destination catalog storage.
//!
//! Seven append-only SQLite tables: three entity tables keyed by Spotify id
//! (artist, album, track) and four join tables holding the exploded
//! relations. The store is constructed once per run and shared by reference
//! across the pipeline stages.

pub mod models;
mod schema;
mod store;

pub use schema::CATALOG_SCHEMA_SQL;
pub use store::{CatalogStore, SqliteCatalogStore};
