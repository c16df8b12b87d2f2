use crate::catalog::statement::Statement;

pub type Extension = Statement<ExtensionBody>;

/// PostgreSQL extension, installed database-wide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExtensionBody {
    pub schema: Option<String>,
}

impl ExtensionBody {
    pub fn in_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
        }
    }
}
