use std::collections::BTreeMap;

use crate::catalog::id::{DbObjectId, QualifiedName};
use crate::catalog::statement::{Statement, StatementBuilder};

pub type Constraint = Statement<ConstraintBody>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    PrimaryKey(KeyConstraint),
    Unique(KeyConstraint),
    ForeignKey(ForeignKey),
    Check {
        expression: String,
        /// PostgreSQL `NO INHERIT`.
        no_inherit: bool,
    },
    Exclusion {
        index_method: String,
        /// Rendered elements, e.g. `room WITH =`, `during WITH &&`.
        elements: Vec<String>,
        predicate: Option<String>,
    },
}

/// Shape shared by PRIMARY KEY and UNIQUE constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyConstraint {
    /// Key columns; MS SQL may carry a sort order (`id DESC`) which is kept verbatim.
    pub columns: Vec<KeyColumn>,
    pub include: Vec<String>,
    pub options: BTreeMap<String, String>,
    /// Index tablespace (PG) or filegroup (MS).
    pub tablespace: Option<String>,
    /// MS SQL `CLUSTERED` / `NONCLUSTERED`; `None` keeps the engine default.
    pub clustered: Option<bool>,
    /// PostgreSQL 15 `NULLS NOT DISTINCT`.
    pub nulls_not_distinct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyColumn {
    pub name: String,
    pub descending: bool,
}

impl KeyColumn {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    /// Denormalized copy of the referenced table; the dependency entry is
    /// recorded alongside by [`ConstraintBody::foreign_key`].
    pub foreign_table: QualifiedName,
    pub foreign_columns: Vec<String>,
    pub match_type: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintBody {
    pub constraint_type: ConstraintType,
    pub deferrable: bool,
    pub initially_deferred: bool,
    /// PG `NOT VALID`; MS `WITH NOCHECK` (constraint not trusted).
    pub not_valid: bool,
    /// MS `NOCHECK CONSTRAINT`.
    pub disabled: bool,
    /// MS `NOT FOR REPLICATION`.
    pub not_for_replication: bool,
}

impl ConstraintBody {
    pub fn new(constraint_type: ConstraintType) -> Self {
        Self {
            constraint_type,
            deferrable: false,
            initially_deferred: false,
            not_valid: false,
            disabled: false,
            not_for_replication: false,
        }
    }

    pub fn primary_key<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::new(ConstraintType::PrimaryKey(KeyConstraint {
            columns: columns.into_iter().map(KeyColumn::asc).collect(),
            ..KeyConstraint::default()
        }))
    }

    pub fn unique<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::new(ConstraintType::Unique(KeyConstraint {
            columns: columns.into_iter().map(KeyColumn::asc).collect(),
            ..KeyConstraint::default()
        }))
    }

    pub fn check(expression: impl Into<String>) -> Self {
        Self::new(ConstraintType::Check {
            expression: expression.into(),
            no_inherit: false,
        })
    }

    pub fn foreign_key<S: Into<String>, F: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        foreign_table: QualifiedName,
        foreign_columns: impl IntoIterator<Item = F>,
    ) -> Self {
        Self::new(ConstraintType::ForeignKey(ForeignKey {
            columns: columns.into_iter().map(Into::into).collect(),
            foreign_table,
            foreign_columns: foreign_columns.into_iter().map(Into::into).collect(),
            match_type: None,
            on_delete: None,
            on_update: None,
        }))
    }

    pub fn not_valid(mut self) -> Self {
        self.not_valid = true;
        self
    }

    pub fn is_primary_key(&self) -> bool {
        matches!(self.constraint_type, ConstraintType::PrimaryKey(_))
    }

    pub fn foreign_key_ref(&self) -> Option<&ForeignKey> {
        match &self.constraint_type {
            ConstraintType::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }

    /// Ids of the referenced table and columns of a foreign key.
    pub fn referenced_ids(&self) -> Vec<DbObjectId> {
        let Some(fk) = self.foreign_key_ref() else {
            return Vec::new();
        };
        let mut ids = vec![fk.foreign_table.table_id()];
        ids.extend(fk.foreign_columns.iter().map(|col| {
            DbObjectId::column(&fk.foreign_table.schema, &fk.foreign_table.name, col)
        }));
        ids
    }
}

impl Constraint {
    /// Start a constraint; foreign keys get their references recorded as dependencies.
    pub fn define(name: impl Into<String>, body: ConstraintBody) -> StatementBuilder<ConstraintBody> {
        let referenced = body.referenced_ids();
        referenced
            .into_iter()
            .fold(Statement::builder(name, body), |builder, id| builder.depends_on(id))
    }
}
