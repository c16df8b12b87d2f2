use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::id::StatementType;
use crate::catalog::statement::Statement;
use crate::dialect::Dialect;

pub type Function = Statement<FunctionBody>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    Procedure,
    Aggregate,
}

impl FunctionKind {
    pub fn statement_type(self) -> StatementType {
        match self {
            FunctionKind::Function => StatementType::Function,
            FunctionKind::Procedure => StatementType::Procedure,
            FunctionKind::Aggregate => StatementType::Aggregate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ArgMode {
    #[default]
    In,
    Out,
    InOut,
    Variadic,
    /// Column of a `RETURNS TABLE (...)` result.
    Table,
}

impl ArgMode {
    /// Whether the argument takes part in the routine's call signature.
    pub fn is_input(self) -> bool {
        matches!(self, ArgMode::In | ArgMode::InOut | ArgMode::Variadic)
    }
}

impl fmt::Display for ArgMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgMode::In => "IN",
            ArgMode::Out => "OUT",
            ArgMode::InOut => "INOUT",
            ArgMode::Variadic => "VARIADIC",
            ArgMode::Table => "TABLE",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FunctionParam {
    pub mode: ArgMode,
    pub name: Option<String>,
    pub data_type: String,
    pub default: Option<String>,
}

impl FunctionParam {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            mode: ArgMode::In,
            name: Some(name.into()),
            data_type: data_type.into(),
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionBody {
    pub kind: FunctionKind,
    pub parameters: Vec<FunctionParam>,
    /// Return type text; `TABLE` results are described by `ArgMode::Table` parameters (PG)
    /// or carried verbatim (MS, e.g. `@t TABLE (id int)`).
    pub return_type: Option<String>,
    pub flavor: FunctionFlavor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionFlavor {
    Pg(PgFunction),
    Ms(MsFunction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PgFunction {
    pub language: String,
    /// Routine body without dollar quotes.
    pub definition: String,
    pub volatility: Option<String>,
    pub strict: bool,
    pub security_definer: bool,
    pub leakproof: bool,
    pub parallel: Option<String>,
    pub cost: Option<String>,
    pub rows: Option<String>,
    /// `SET name = value` entries.
    pub configuration: BTreeMap<String, String>,
    /// Aggregate options (`SFUNC`, `STYPE`, `FINALFUNC`, `INITCOND`, ...).
    pub aggregate: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MsFunction {
    /// Statement text after `AS`.
    pub body: String,
    pub ansi_nulls: bool,
    pub quoted_identifier: bool,
    /// `WITH` options, e.g. `SCHEMABINDING`, `EXECUTE AS OWNER`.
    pub options: Vec<String>,
    pub clr: Option<ClrMethod>,
}

impl Default for MsFunction {
    fn default() -> Self {
        Self {
            body: String::new(),
            ansi_nulls: true,
            quoted_identifier: true,
            options: Vec::new(),
            clr: None,
        }
    }
}

/// `EXTERNAL NAME assembly.class.method` of a CLR routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClrMethod {
    pub assembly: String,
    pub class: String,
    pub method: String,
}

impl FunctionBody {
    pub fn pg(kind: FunctionKind, language: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            kind,
            parameters: Vec::new(),
            return_type: None,
            flavor: FunctionFlavor::Pg(PgFunction {
                language: language.into(),
                definition: definition.into(),
                ..PgFunction::default()
            }),
        }
    }

    pub fn ms(kind: FunctionKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            parameters: Vec::new(),
            return_type: None,
            flavor: FunctionFlavor::Ms(MsFunction {
                body: body.into(),
                ..MsFunction::default()
            }),
        }
    }

    pub fn with_param(mut self, param: FunctionParam) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn dialect(&self) -> Dialect {
        match self.flavor {
            FunctionFlavor::Pg(_) => Dialect::Pg,
            FunctionFlavor::Ms(_) => Dialect::Ms,
        }
    }

    pub fn pg_attrs(&self) -> Option<&PgFunction> {
        match &self.flavor {
            FunctionFlavor::Pg(pg) => Some(pg),
            FunctionFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs(&self) -> Option<&MsFunction> {
        match &self.flavor {
            FunctionFlavor::Ms(ms) => Some(ms),
            FunctionFlavor::Pg(_) => None,
        }
    }

    pub fn pg_attrs_mut(&mut self) -> Option<&mut PgFunction> {
        match &mut self.flavor {
            FunctionFlavor::Pg(pg) => Some(pg),
            FunctionFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs_mut(&mut self) -> Option<&mut MsFunction> {
        match &mut self.flavor {
            FunctionFlavor::Ms(ms) => Some(ms),
            FunctionFlavor::Pg(_) => None,
        }
    }

    /// Comma separated input argument types, as used in `DROP FUNCTION f(...)`.
    pub fn argument_types(&self) -> String {
        self.parameters
            .iter()
            .filter(|p| p.mode.is_input())
            .map(|p| match p.mode {
                ArgMode::Variadic => format!("VARIADIC {}", p.data_type),
                _ => p.data_type.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Identity name inside the schema: PG routines can be overloaded and are
    /// identified by signature, MS routines by name.
    pub fn signature(&self, name: &str) -> String {
        match self.flavor {
            FunctionFlavor::Pg(_) => format!("{name}({})", self.argument_types()),
            FunctionFlavor::Ms(_) => name.to_string(),
        }
    }

    /// MS table-valued functions cannot be altered into scalar ones or back.
    pub fn is_table_valued(&self) -> bool {
        self.return_type.as_deref().is_some_and(|rt| {
            let upper = rt.trim().to_ascii_uppercase();
            upper == "TABLE" || upper.contains(" TABLE")
        })
    }

    pub fn is_clr(&self) -> bool {
        self.ms_attrs().is_some_and(|ms| ms.clr.is_some())
    }
}
