use std::collections::BTreeMap;

use crate::catalog::statement::Statement;
use crate::dialect::Dialect;

pub type CustomType = Statement<TypeBody>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeBody {
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// PG `CREATE TYPE t AS (...)`.
    Composite { attributes: Vec<CompositeAttribute> },
    /// PG `CREATE TYPE t AS ENUM (...)`.
    Enum { values: Vec<String> },
    /// PG `CREATE TYPE t AS RANGE (subtype = ..., ...)`.
    Range {
        subtype: String,
        options: BTreeMap<String, String>,
    },
    /// PG base type with its input/output functions.
    Base { options: BTreeMap<String, String> },
    /// PG shell type, `CREATE TYPE t`.
    Shell,
    /// MS `CREATE TYPE t FROM base [NOT NULL]`.
    Alias { base_type: String, not_null: bool },
    /// MS `CREATE TYPE t AS TABLE (...)`; entries are rendered definitions.
    Table { definitions: Vec<String> },
    /// MS `CREATE TYPE t EXTERNAL NAME assembly.class`.
    Clr { assembly: String, class: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeAttribute {
    pub name: String,
    pub data_type: String,
    pub collation: Option<String>,
}

impl CompositeAttribute {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            collation: None,
        }
    }
}

impl TypeBody {
    pub fn new(kind: TypeKind) -> Self {
        Self { kind }
    }

    pub fn enumeration<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(TypeKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn composite(attributes: Vec<CompositeAttribute>) -> Self {
        Self::new(TypeKind::Composite { attributes })
    }

    pub fn dialect(&self) -> Dialect {
        match self.kind {
            TypeKind::Alias { .. } | TypeKind::Table { .. } | TypeKind::Clr { .. } => Dialect::Ms,
            _ => Dialect::Pg,
        }
    }
}
