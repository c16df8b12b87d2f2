use std::collections::BTreeMap;

use crate::catalog::statement::Statement;
use crate::dialect::Dialect;

pub type Column = Statement<ColumnBody>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnBody {
    /// Type as written in DDL, e.g. `integer`, `character varying(20)`, `[nvarchar](50)`.
    pub data_type: String,
    pub collation: Option<String>,
    pub not_null: bool,
    pub default: Option<String>,
    /// Generated (PG) or computed (MS) column expression.
    pub generated: Option<GeneratedColumn>,
    pub identity: Option<Identity>,
    pub flavor: ColumnFlavor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedColumn {
    pub expression: String,
    /// `STORED` on PostgreSQL, `PERSISTED` on MS SQL.
    pub stored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Pg {
        /// `GENERATED ALWAYS` when true, `GENERATED BY DEFAULT` otherwise.
        always: bool,
        options: IdentityOptions,
    },
    Ms {
        seed: String,
        increment: String,
    },
}

/// Sequence options of a PostgreSQL identity column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IdentityOptions {
    pub start: Option<i64>,
    pub increment: Option<i64>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub cache: Option<i64>,
    pub cycle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnFlavor {
    Pg(PgColumn),
    Ms(MsColumn),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PgColumn {
    /// Column comes from an inheritance or partition parent. Only local
    /// overrides (default, not null) are rendered for it.
    pub inherited: bool,
    pub storage: Option<String>,
    pub statistics: Option<i32>,
    pub compression: Option<String>,
    pub options: BTreeMap<String, String>,
    pub foreign_options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MsColumn {
    pub sparse: bool,
    pub filestream: bool,
    pub rowguidcol: bool,
    /// Applies to the identity property.
    pub not_for_replication: bool,
    /// Dynamic data masking function, e.g. `default()` or `email()`.
    pub masking: Option<String>,
    /// Name of the default constraint, when the default is named.
    pub default_name: Option<String>,
    pub period: Option<RowPeriod>,
    pub hidden: bool,
}

/// `GENERATED ALWAYS AS ROW START|END` of a system-versioned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowPeriod {
    Start,
    End,
}

impl ColumnBody {
    fn with_flavor(data_type: impl Into<String>, flavor: ColumnFlavor) -> Self {
        Self {
            data_type: data_type.into(),
            collation: None,
            not_null: false,
            default: None,
            generated: None,
            identity: None,
            flavor,
        }
    }

    pub fn pg(data_type: impl Into<String>) -> Self {
        Self::with_flavor(data_type, ColumnFlavor::Pg(PgColumn::default()))
    }

    pub fn ms(data_type: impl Into<String>) -> Self {
        Self::with_flavor(data_type, ColumnFlavor::Ms(MsColumn::default()))
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    pub fn dialect(&self) -> Dialect {
        match self.flavor {
            ColumnFlavor::Pg(_) => Dialect::Pg,
            ColumnFlavor::Ms(_) => Dialect::Ms,
        }
    }

    pub fn pg_attrs(&self) -> Option<&PgColumn> {
        match &self.flavor {
            ColumnFlavor::Pg(pg) => Some(pg),
            ColumnFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs(&self) -> Option<&MsColumn> {
        match &self.flavor {
            ColumnFlavor::Ms(ms) => Some(ms),
            ColumnFlavor::Pg(_) => None,
        }
    }

    pub fn pg_attrs_mut(&mut self) -> Option<&mut PgColumn> {
        match &mut self.flavor {
            ColumnFlavor::Pg(pg) => Some(pg),
            ColumnFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs_mut(&mut self) -> Option<&mut MsColumn> {
        match &mut self.flavor {
            ColumnFlavor::Ms(ms) => Some(ms),
            ColumnFlavor::Pg(_) => None,
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.pg_attrs().is_some_and(|pg| pg.inherited)
    }
}
