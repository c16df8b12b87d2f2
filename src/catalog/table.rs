use std::collections::BTreeMap;

use crate::catalog::column::Column;
use crate::catalog::id::{QualifiedName, StatementType};
use crate::catalog::statement::{Children, Container, Statement, StatementBuilder};
use crate::dialect::Dialect;
use crate::error::{ModelError, ModelResult};

pub type Table = Statement<TableBody>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableBody {
    pub(crate) columns: Vec<Column>,
    pub(crate) children: Children,
    /// Storage options (`WITH (...)`).
    pub options: BTreeMap<String, String>,
    /// Tablespace on PostgreSQL, filegroup on MS SQL.
    pub tablespace: Option<String>,
    pub flavor: TableFlavor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableFlavor {
    Pg(PgTable),
    Ms(MsTable),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PgTable {
    pub kind: PgTableKind,
    pub inherits: Vec<QualifiedName>,
    pub logged: bool,
    pub access_method: Option<String>,
    pub rls_enabled: bool,
    pub rls_forced: bool,
    /// Greenplum distribution clause, e.g. `DISTRIBUTED BY (id)`.
    pub distribution: Option<String>,
    /// Options of a foreign table.
    pub foreign_options: BTreeMap<String, String>,
}

impl Default for PgTable {
    fn default() -> Self {
        Self {
            kind: PgTableKind::Regular,
            inherits: Vec::new(),
            logged: true,
            access_method: None,
            rls_enabled: false,
            rls_forced: false,
            distribution: None,
            foreign_options: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PgTableKind {
    Regular,
    /// Partitioned table with its `PARTITION BY` key, e.g. `RANGE (created_at)`.
    Partitioned { partition_by: String },
    /// A partition of `parent`; `bound` is the full bound clause
    /// (`FOR VALUES FROM (..) TO (..)` or `DEFAULT`).
    Partition { parent: QualifiedName, bound: String },
    Typed { of_type: String },
    Foreign { server: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MsTable {
    pub ansi_nulls: bool,
    pub text_image: Option<String>,
    pub filestream: Option<String>,
    /// Change tracking. `None` means off; `Some(track_columns_updated)` means on.
    pub tracked: Option<bool>,
    /// `PERIOD FOR SYSTEM_TIME (start, end)`.
    pub period: Option<(String, String)>,
    /// History table of a system-versioned table. `Some` means versioning is on.
    pub history_table: Option<QualifiedName>,
}

impl Default for MsTable {
    fn default() -> Self {
        Self {
            ansi_nulls: true,
            text_image: None,
            filestream: None,
            tracked: None,
            period: None,
            history_table: None,
        }
    }
}

impl TableBody {
    fn with_flavor(flavor: TableFlavor) -> Self {
        Self {
            columns: Vec::new(),
            children: Children::default(),
            options: BTreeMap::new(),
            tablespace: None,
            flavor,
        }
    }

    pub fn pg() -> Self {
        Self::with_flavor(TableFlavor::Pg(PgTable::default()))
    }

    pub fn ms() -> Self {
        Self::with_flavor(TableFlavor::Ms(MsTable::default()))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn pg_attrs(&self) -> Option<&PgTable> {
        match &self.flavor {
            TableFlavor::Pg(pg) => Some(pg),
            TableFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs(&self) -> Option<&MsTable> {
        match &self.flavor {
            TableFlavor::Ms(ms) => Some(ms),
            TableFlavor::Pg(_) => None,
        }
    }

    pub fn pg_attrs_mut(&mut self) -> Option<&mut PgTable> {
        match &mut self.flavor {
            TableFlavor::Pg(pg) => Some(pg),
            TableFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs_mut(&mut self) -> Option<&mut MsTable> {
        match &mut self.flavor {
            TableFlavor::Ms(ms) => Some(ms),
            TableFlavor::Pg(_) => None,
        }
    }

    pub fn is_foreign(&self) -> bool {
        matches!(
            self.pg_attrs().map(|pg| &pg.kind),
            Some(PgTableKind::Foreign { .. })
        )
    }

    /// Parents whose columns this table inherits (inheritance and partitioning).
    pub fn parents(&self) -> Vec<&QualifiedName> {
        let Some(pg) = self.pg_attrs() else {
            return Vec::new();
        };
        let mut parents: Vec<&QualifiedName> = pg.inherits.iter().collect();
        if let PgTableKind::Partition { parent, .. } = &pg.kind {
            parents.push(parent);
        }
        parents
    }

    /// Non-inherited columns in declaration order.
    pub fn local_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_inherited())
    }
}

impl Container for TableBody {
    const KIND: StatementType = StatementType::Table;

    fn dialect(&self) -> Dialect {
        match self.flavor {
            TableFlavor::Pg(_) => Dialect::Pg,
            TableFlavor::Ms(_) => Dialect::Ms,
        }
    }

    fn children(&self) -> &Children {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    fn supports(&self, kind: StatementType) -> bool {
        match kind {
            StatementType::Constraint | StatementType::Index | StatementType::Trigger => true,
            StatementType::Policy => self.dialect() == Dialect::Pg,
            StatementType::Statistics => self.dialect() == Dialect::Ms,
            _ => false,
        }
    }
}

impl StatementBuilder<TableBody> {
    /// Append a column; names must be unique within the table.
    pub fn column(mut self, column: Column) -> ModelResult<Self> {
        if self.body_mut().columns.iter().any(|c| c.name() == column.name()) {
            return Err(ModelError::DuplicateChild {
                parent: format!("{} {}", StatementType::Table, self.name()),
                kind: StatementType::Column,
                name: column.name().to_string(),
            });
        }
        self.body_mut().columns.push(column);
        Ok(self)
    }
}
