use std::collections::BTreeMap;

use crate::catalog::statement::Statement;

pub type Index = Statement<IndexBody>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexBody {
    pub unique: bool,
    /// Access method (`btree`, `gin`, ...). `None` is the engine default.
    pub method: Option<String>,
    /// PG: `CLUSTER ON` this index. MS: `CLUSTERED` index.
    pub clustered: bool,
    /// MS `COLUMNSTORE` index.
    pub columnstore: bool,
    pub columns: Vec<IndexColumn>,
    pub include: Vec<String>,
    pub predicate: Option<String>,
    pub options: BTreeMap<String, String>,
    /// Tablespace (PG) or filegroup (MS).
    pub tablespace: Option<String>,
    pub nulls_not_distinct: bool,
    /// PG `ON ONLY` for indexes on partitioned tables.
    pub only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexColumn {
    /// Column name or expression; expressions are wrapped in parentheses when rendered.
    pub expression: String,
    pub is_expression: bool,
    pub collation: Option<String>,
    pub opclass: Option<String>,
    pub descending: bool,
    /// PG `NULLS FIRST` (`Some(true)`) / `NULLS LAST` (`Some(false)`).
    pub nulls_first: Option<bool>,
}

impl IndexColumn {
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            expression: name.into(),
            ..Self::default()
        }
    }

    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            is_expression: true,
            ..Self::default()
        }
    }

    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }
}

impl IndexBody {
    pub fn on<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(IndexColumn::column).collect(),
            ..Self::default()
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// True when both indexes would need the same underlying structure, so
    /// only alterable attributes differ.
    pub fn same_structure(&self, other: &IndexBody, ms_rules: bool) -> bool {
        let common = self.unique == other.unique
            && self.method == other.method
            && self.columnstore == other.columnstore
            && self.columns == other.columns
            && self.include == other.include
            && self.predicate == other.predicate
            && self.nulls_not_distinct == other.nulls_not_distinct
            && self.only == other.only;
        if ms_rules {
            common
                && self.clustered == other.clustered
                && self.options == other.options
                && self.tablespace == other.tablespace
        } else {
            common
        }
    }
}
