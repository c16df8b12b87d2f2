use crate::catalog::id::{DbObjectId, QualifiedName};
use crate::catalog::statement::Statement;

pub type Sequence = Statement<SequenceBody>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SequenceBody {
    pub data_type: Option<String>,
    pub start: Option<i64>,
    pub increment: Option<i64>,
    /// `None` renders as `NO MINVALUE`.
    pub min_value: Option<i64>,
    /// `None` renders as `NO MAXVALUE`.
    pub max_value: Option<i64>,
    /// `None` keeps the engine default (PG) or renders `NO CACHE` (MS).
    pub cache: Option<i64>,
    pub cycle: bool,
    /// PG `OWNED BY table.column`.
    pub owned_by: Option<SequenceOwner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceOwner {
    pub table: QualifiedName,
    pub column: String,
}

impl SequenceOwner {
    pub fn column_id(&self) -> DbObjectId {
        DbObjectId::column(&self.table.schema, &self.table.name, &self.column)
    }
}

impl SequenceBody {
    pub fn new(increment: i64) -> Self {
        Self {
            increment: Some(increment),
            ..Self::default()
        }
    }
}
