use std::fmt;

/// Statement type tag used for dispatch, identity and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatementType {
    Schema,
    Extension,
    Role,
    User,
    Assembly,
    Type,
    Domain,
    Sequence,
    Table,
    Column,
    Constraint,
    Index,
    Trigger,
    Policy,
    Statistics,
    Function,
    Procedure,
    Aggregate,
    View,
}

impl StatementType {
    /// Keyword used in DDL (`DROP <keyword> ...`, `COMMENT ON <keyword> ...`).
    pub fn keyword(self) -> &'static str {
        match self {
            StatementType::Schema => "SCHEMA",
            StatementType::Extension => "EXTENSION",
            StatementType::Role => "ROLE",
            StatementType::User => "USER",
            StatementType::Assembly => "ASSEMBLY",
            StatementType::Type => "TYPE",
            StatementType::Domain => "DOMAIN",
            StatementType::Sequence => "SEQUENCE",
            StatementType::Table => "TABLE",
            StatementType::Column => "COLUMN",
            StatementType::Constraint => "CONSTRAINT",
            StatementType::Index => "INDEX",
            StatementType::Trigger => "TRIGGER",
            StatementType::Policy => "POLICY",
            StatementType::Statistics => "STATISTICS",
            StatementType::Function => "FUNCTION",
            StatementType::Procedure => "PROCEDURE",
            StatementType::Aggregate => "AGGREGATE",
            StatementType::View => "VIEW",
        }
    }

    /// Whether objects of this type live under a table or view.
    pub fn is_table_child(self) -> bool {
        matches!(
            self,
            StatementType::Column
                | StatementType::Constraint
                | StatementType::Index
                | StatementType::Trigger
                | StatementType::Policy
                | StatementType::Statistics
        )
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword().to_lowercase())
    }
}

/// A unique identifier for any modeled database object.
///
/// Identity is derived from the object's position in the tree:
/// database-level objects carry neither schema nor table, schema-level objects
/// carry a schema, and table children carry both. PostgreSQL routines use
/// their signature (`name(argtypes)`) as `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbObjectId {
    pub kind: StatementType,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub name: String,
}

impl DbObjectId {
    /// Identifier of a database-level object (schema, extension, role, user, assembly).
    pub fn database_level(kind: StatementType, name: impl Into<String>) -> Self {
        Self {
            kind,
            schema: None,
            table: None,
            name: name.into(),
        }
    }

    pub fn schema(name: impl Into<String>) -> Self {
        Self::database_level(StatementType::Schema, name)
    }

    /// Identifier of an object that lives directly in a schema.
    pub fn in_schema(kind: StatementType, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            schema: Some(schema.into()),
            table: None,
            name: name.into(),
        }
    }

    pub fn table(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::in_schema(StatementType::Table, schema, name)
    }

    pub fn view(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::in_schema(StatementType::View, schema, name)
    }

    /// Identifier of an object owned by a table or view.
    pub fn table_child(
        kind: StatementType,
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            schema: Some(schema.into()),
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn column(
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::table_child(StatementType::Column, schema, table, name)
    }

    /// Get the schema name for this object. A schema returns its own name.
    pub fn schema_name(&self) -> Option<&str> {
        match self.kind {
            StatementType::Schema => Some(self.name.as_str()),
            _ => self.schema.as_deref(),
        }
    }
}

impl fmt::Display for DbObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind)?;
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        write!(f, "{}", self.name)
    }
}

/// A schema-qualified object name used by denormalized references
/// (foreign keys, inheritance parents, history tables).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    pub fn table_id(&self) -> DbObjectId {
        DbObjectId::table(&self.schema, &self.name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}
