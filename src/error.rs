use thiserror::Error;

use crate::catalog::id::{DbObjectId, StatementType};
use crate::dialect::Dialect;

/// Structural violations raised while building an object tree.
///
/// These indicate a bug in whatever produced the tree (parser, loader, test
/// fixture) and are never recovered from inside the crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{parent} already contains a {kind} named '{name}'")]
    DuplicateChild {
        parent: String,
        kind: StatementType,
        name: String,
    },

    #[error("{parent} cannot contain a {kind} in the {dialect} dialect")]
    UnsupportedChild {
        parent: String,
        kind: StatementType,
        dialect: Dialect,
    },

    #[error("{object} is modeled for {found} but the database is {expected}")]
    DialectMismatch {
        expected: Dialect,
        found: Dialect,
        object: DbObjectId,
    },
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
