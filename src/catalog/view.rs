use std::collections::BTreeMap;

use crate::catalog::id::StatementType;
use crate::catalog::statement::{Children, Container, Statement};
use crate::dialect::Dialect;

pub type View = Statement<ViewBody>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewBody {
    /// Explicit output column names, `CREATE VIEW v (a, b) AS ...`.
    pub column_names: Vec<String>,
    pub(crate) children: Children,
    pub flavor: ViewFlavor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewFlavor {
    Pg(PgView),
    Ms(MsView),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PgView {
    pub query: String,
    pub materialized: bool,
    /// `WITH (security_barrier = true, check_option = local)`.
    pub options: BTreeMap<String, String>,
    /// Materialized views only.
    pub tablespace: Option<String>,
    /// Materialized views only; `WITH NO DATA` when false.
    pub with_data: bool,
    pub column_defaults: BTreeMap<String, String>,
    pub column_comments: BTreeMap<String, String>,
}

impl Default for PgView {
    fn default() -> Self {
        Self {
            query: String::new(),
            materialized: false,
            options: BTreeMap::new(),
            tablespace: None,
            with_data: true,
            column_defaults: BTreeMap::new(),
            column_comments: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MsView {
    /// Select statement after `AS`.
    pub query: String,
    pub ansi_nulls: bool,
    pub quoted_identifier: bool,
    /// `SCHEMABINDING`, `VIEW_METADATA`, `ENCRYPTION`.
    pub options: Vec<String>,
    pub with_check_option: bool,
}

impl Default for MsView {
    fn default() -> Self {
        Self {
            query: String::new(),
            ansi_nulls: true,
            quoted_identifier: true,
            options: Vec::new(),
            with_check_option: false,
        }
    }
}

impl ViewBody {
    pub fn pg(query: impl Into<String>) -> Self {
        Self {
            column_names: Vec::new(),
            children: Children::default(),
            flavor: ViewFlavor::Pg(PgView {
                query: query.into(),
                ..PgView::default()
            }),
        }
    }

    pub fn ms(query: impl Into<String>) -> Self {
        Self {
            column_names: Vec::new(),
            children: Children::default(),
            flavor: ViewFlavor::Ms(MsView {
                query: query.into(),
                ..MsView::default()
            }),
        }
    }

    pub fn pg_attrs(&self) -> Option<&PgView> {
        match &self.flavor {
            ViewFlavor::Pg(pg) => Some(pg),
            ViewFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs(&self) -> Option<&MsView> {
        match &self.flavor {
            ViewFlavor::Ms(ms) => Some(ms),
            ViewFlavor::Pg(_) => None,
        }
    }

    pub fn pg_attrs_mut(&mut self) -> Option<&mut PgView> {
        match &mut self.flavor {
            ViewFlavor::Pg(pg) => Some(pg),
            ViewFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs_mut(&mut self) -> Option<&mut MsView> {
        match &mut self.flavor {
            ViewFlavor::Ms(ms) => Some(ms),
            ViewFlavor::Pg(_) => None,
        }
    }

    pub fn is_materialized(&self) -> bool {
        self.pg_attrs().is_some_and(|pg| pg.materialized)
    }

    /// DDL keyword for this view (`VIEW` or `MATERIALIZED VIEW`).
    pub fn keyword(&self) -> &'static str {
        if self.is_materialized() {
            "MATERIALIZED VIEW"
        } else {
            "VIEW"
        }
    }
}

impl Container for ViewBody {
    const KIND: StatementType = StatementType::View;

    fn dialect(&self) -> Dialect {
        match self.flavor {
            ViewFlavor::Pg(_) => Dialect::Pg,
            ViewFlavor::Ms(_) => Dialect::Ms,
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
            StatementType::Trigger => true,
            // PG only indexes materialized views; MS indexed views.
            StatementType::Index => self.dialect() == Dialect::Ms || self.is_materialized(),
            StatementType::Statistics => self.dialect() == Dialect::Ms,
            _ => false,
        }
    }
}
