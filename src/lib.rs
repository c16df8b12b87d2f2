//! Schema object model and DDL diff engine for PostgreSQL/Greenplum and MS SQL.
//!
//! Callers build two [`catalog::Database`] trees (usually from a parser or a
//! live catalog, both outside this crate) and hand them to
//! [`diff::diff_databases`], which returns an ordered [`render::SqlScript`].

pub mod catalog;
pub mod config;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod render;

pub use catalog::Database;
pub use config::Settings;
pub use dialect::Dialect;
pub use diff::{ObjectState, diff_databases};
pub use error::ModelError;
pub use render::{Slot, SqlScript};
