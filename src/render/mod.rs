//! Creation and drop SQL for every statement kind.
//!
//! Rendering is a pure function of the statement, its [`SqlContext`] and the
//! settings. Statements are collected into an [`SqlScript`] without their
//! delimiter; [`SqlScript::to_sql`] adds it when the script is joined.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::catalog::id::{DbObjectId, StatementType};
use crate::catalog::table::Table;
use crate::catalog::view::View;
use crate::catalog::comments::CommentAction;
use crate::catalog::{AnyStatement, with_statement};
use crate::config::Settings;
use crate::dialect::{Dialect, dollar_quote};

pub mod assembly;
pub mod column;
pub mod comment;
pub mod constraint;
pub mod domain;
pub mod extension;
pub mod function;
pub mod grant;
pub mod index;
pub mod owner;
pub mod policy;
pub mod principal;
pub mod schema;
pub mod sequence;
pub mod statistics;
pub mod table;
pub mod trigger;
pub mod types;
pub mod view;

/// Ordering hint for a statement in the assembled script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Runs before every regular statement (e.g. disabling change tracking).
    Begin,
    #[default]
    Mid,
    /// Runs after every regular statement (e.g. re-enabling system versioning).
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStatement {
    pub slot: Slot,
    pub sql: String,
}

/// An ordered list of SQL statements tagged with their [`Slot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlScript {
    statements: Vec<ScriptStatement>,
}

impl SqlScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sql: impl Into<String>) {
        self.push_to(Slot::Mid, sql);
    }

    pub fn push_to(&mut self, slot: Slot, sql: impl Into<String>) {
        self.statements.push(ScriptStatement {
            slot,
            sql: sql.into(),
        });
    }

    pub fn append(&mut self, other: SqlScript) {
        self.statements.extend(other.statements);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Statements in insertion order.
    pub fn statements(&self) -> &[ScriptStatement] {
        &self.statements
    }

    /// Statements of one slot in insertion order.
    pub fn in_slot(&self, slot: Slot) -> impl Iterator<Item = &str> {
        self.statements
            .iter()
            .filter(move |s| s.slot == slot)
            .map(|s| s.sql.as_str())
    }

    /// Statements in assembly order: Begin, then Mid, then End.
    pub fn ordered(&self) -> impl Iterator<Item = &str> {
        self.in_slot(Slot::Begin)
            .chain(self.in_slot(Slot::Mid))
            .chain(self.in_slot(Slot::End))
    }

    /// Join the script into executable text, adding delimiters and the
    /// transaction and function-body-check wrappers the settings ask for.
    pub fn to_sql(&self, dialect: Dialect, settings: &Settings) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if settings.script_in_transaction {
            parts.push(match dialect {
                Dialect::Pg => "BEGIN",
                Dialect::Ms => "BEGIN TRANSACTION",
            });
        }
        if dialect == Dialect::Pg && settings.disable_check_function_bodies {
            parts.push("SET check_function_bodies = false");
        }
        parts.extend(self.ordered());
        if settings.script_in_transaction {
            parts.push(match dialect {
                Dialect::Pg => "COMMIT",
                Dialect::Ms => "COMMIT TRANSACTION",
            });
        }

        parts
            .iter()
            .map(|sql| format!("{sql}{}", dialect.delimiter()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Where a statement sits in its tree, plus the settings it renders under.
#[derive(Debug, Clone, Copy)]
pub struct SqlContext<'a> {
    pub id: &'a DbObjectId,
    pub dialect: Dialect,
    pub settings: &'a Settings,
    /// Owning table or view of a child statement.
    pub parent: Option<AnyStatement<'a>>,
}

impl<'a> SqlContext<'a> {
    pub fn new(id: &'a DbObjectId, dialect: Dialect, settings: &'a Settings) -> Self {
        Self {
            id,
            dialect,
            settings,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<AnyStatement<'a>>) -> Self {
        self.parent = parent;
        self
    }

    pub fn quote(&self, name: &str) -> String {
        self.dialect.quote_ident(name)
    }

    pub fn literal(&self, value: &str) -> String {
        self.dialect.quote_literal(value)
    }

    pub fn schema(&self) -> &'a str {
        self.id.schema.as_deref().unwrap_or(self.id.name.as_str())
    }

    /// `name` qualified with this statement's schema, or bare for
    /// database-level statements.
    pub fn qualified(&self, name: &str) -> String {
        match &self.id.schema {
            Some(schema) => self.dialect.quote_qualified(schema, name),
            None => self.quote(name),
        }
    }

    /// Qualified name of the owning table or view.
    pub fn parent_name(&self) -> String {
        let table = self.id.table.as_deref().unwrap_or_default();
        self.qualified(table)
    }

    pub fn parent_table(&self) -> Option<&'a Table> {
        match self.parent {
            Some(AnyStatement::Table(t)) => Some(t),
            _ => None,
        }
    }

    pub fn parent_view(&self) -> Option<&'a View> {
        match self.parent {
            Some(AnyStatement::View(v)) => Some(v),
            _ => None,
        }
    }

    pub fn parent_is_foreign(&self) -> bool {
        self.parent_table().is_some_and(|t| t.is_foreign())
    }

    /// `ALTER TABLE` prefix for statements on the owning table.
    pub fn alter_parent(&self, only: bool) -> String {
        let keyword = if self.parent_is_foreign() {
            "FOREIGN TABLE"
        } else if self.parent_view().is_some() {
            self.parent_view().map_or("VIEW", |v| v.keyword())
        } else {
            "TABLE"
        };
        let only = if only && self.dialect == Dialect::Pg {
            "ONLY "
        } else {
            ""
        };
        format!("ALTER {keyword} {only}{}", self.parent_name())
    }

    pub fn comment_slot(&self) -> Slot {
        if self.settings.comments_to_end {
            Slot::End
        } else {
            Slot::Mid
        }
    }

    pub fn if_not_exists(&self) -> &'static str {
        if self.settings.generate_exists {
            " IF NOT EXISTS"
        } else {
            ""
        }
    }

    pub fn if_exists(&self) -> &'static str {
        if self.settings.drop_if_exists {
            " IF EXISTS"
        } else {
            ""
        }
    }

    /// Wrap a PostgreSQL statement that has no `IF NOT EXISTS` form in a DO
    /// block that ignores the duplicate-object error.
    pub fn guarded(&self, sql: String) -> String {
        if self.dialect == Dialect::Pg && self.settings.generate_exists_do_block {
            let block = format!(
                "\nBEGIN\n    {sql};\nEXCEPTION WHEN OTHERS THEN\n    null;\nEND;\n"
            );
            format!("DO {}", dollar_quote(&block))
        } else {
            sql
        }
    }
}

/// How owner, comment and privilege statements address an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Keyword after `COMMENT ON`, e.g. `TABLE`, `MATERIALIZED VIEW`.
    pub keyword: &'static str,
    /// Name as written after the keyword, e.g. `public.t`, `c ON public.t`.
    pub name: String,
    /// Target of `GRANT .. ON`, e.g. `TABLE public.t`, `OBJECT::[dbo].[t]`.
    pub grant_target: Option<String>,
    /// Columns a column-level privilege applies to.
    pub grant_columns: Vec<String>,
    /// Target of `ALTER .. OWNER TO` (PG) or `ALTER AUTHORIZATION ON` (MS).
    pub owner_target: Option<String>,
    pub schema_scoped: bool,
    /// MS extended property levels (type, name), outermost first.
    pub levels: Vec<(&'static str, String)>,
}

fn ms_class_target(ctx: &SqlContext<'_>, class: &str, name: &str) -> String {
    format!("{class}::{}", ctx.qualified(name))
}

/// Resolve how `statement` is addressed by owner, comment and privilege SQL.
pub fn object_ref(ctx: &SqlContext<'_>, statement: AnyStatement<'_>) -> ObjectRef {
    let dialect = ctx.dialect;
    let name = statement.name();
    let schema_level = vec![("SCHEMA", ctx.id.schema.clone().unwrap_or_default())];
    let qualified = ctx.qualified(name);

    let schema_object = |keyword: &'static str,
                         pg_grant: &'static str,
                         ms_class: &'static str,
                         level: &'static str,
                         pg_name: String| {
        let (grant_target, owner_target) = match dialect {
            Dialect::Pg => (
                format!("{pg_grant} {pg_name}"),
                format!("{keyword} {pg_name}"),
            ),
            Dialect::Ms => {
                let target = ms_class_target(ctx, ms_class, name);
                (target.clone(), target)
            }
        };
        let mut levels = schema_level.clone();
        levels.push((level, name.to_string()));
        ObjectRef {
            keyword,
            name: pg_name,
            grant_target: Some(grant_target),
            grant_columns: Vec::new(),
            owner_target: Some(owner_target),
            schema_scoped: true,
            levels,
        }
    };

    let child = |keyword: &'static str, level: &'static str, pg_name: String| {
        let mut levels = parent_levels(ctx);
        levels.push((level, name.to_string()));
        ObjectRef {
            keyword,
            name: pg_name,
            grant_target: None,
            grant_columns: Vec::new(),
            owner_target: None,
            schema_scoped: true,
            levels,
        }
    };

    let database_object = |keyword: &'static str, class: &'static str, level: Option<&'static str>| {
        let quoted = ctx.quote(name);
        let target = match dialect {
            Dialect::Pg => format!("{keyword} {quoted}"),
            Dialect::Ms => format!("{class}::{quoted}"),
        };
        ObjectRef {
            keyword,
            name: quoted,
            grant_target: Some(target.clone()),
            grant_columns: Vec::new(),
            owner_target: Some(target),
            schema_scoped: false,
            levels: level.map(|l| vec![(l, name.to_string())]).unwrap_or_default(),
        }
    };

    match statement {
        AnyStatement::Schema(_) => database_object("SCHEMA", "SCHEMA", Some("SCHEMA")),
        AnyStatement::Extension(_) => ObjectRef {
            grant_target: None,
            owner_target: None,
            ..database_object("EXTENSION", "EXTENSION", None)
        },
        AnyStatement::Role(_) => database_object("ROLE", "ROLE", None),
        AnyStatement::User(_) => ObjectRef {
            owner_target: None,
            ..database_object("USER", "USER", Some("USER"))
        },
        AnyStatement::Assembly(_) => database_object("ASSEMBLY", "ASSEMBLY", Some("ASSEMBLY")),
        AnyStatement::Table(t) => {
            let keyword = if t.is_foreign() { "FOREIGN TABLE" } else { "TABLE" };
            schema_object(keyword, "TABLE", "OBJECT", "TABLE", qualified)
        }
        AnyStatement::View(v) => schema_object(v.keyword(), "TABLE", "OBJECT", "VIEW", qualified),
        AnyStatement::Sequence(_) => {
            schema_object("SEQUENCE", "SEQUENCE", "OBJECT", "SEQUENCE", qualified)
        }
        AnyStatement::Type(_) => schema_object("TYPE", "TYPE", "TYPE", "TYPE", qualified),
        AnyStatement::Domain(_) => schema_object("DOMAIN", "DOMAIN", "TYPE", "TYPE", qualified),
        AnyStatement::Function(f) => {
            let keyword = f.kind.statement_type().keyword();
            let pg_name = match dialect {
                Dialect::Pg => format!("{qualified}({})", f.argument_types()),
                Dialect::Ms => qualified,
            };
            let pg_grant = match f.kind.statement_type() {
                StatementType::Procedure => "PROCEDURE",
                _ => "FUNCTION",
            };
            let level = match f.kind.statement_type() {
                StatementType::Procedure => "PROCEDURE",
                _ => "FUNCTION",
            };
            schema_object(keyword, pg_grant, "OBJECT", level, pg_name)
        }
        AnyStatement::Column(_) => {
            let parent = ctx.parent.map(|p| object_ref(&ctx.with_parent(None), p));
            let mut levels = parent_levels(ctx);
            levels.push(("COLUMN", name.to_string()));
            ObjectRef {
                keyword: "COLUMN",
                name: format!("{}.{}", ctx.parent_name(), ctx.quote(name)),
                grant_target: parent.as_ref().and_then(|p| p.grant_target.clone()),
                grant_columns: vec![name.to_string()],
                owner_target: None,
                schema_scoped: true,
                levels,
            }
        }
        AnyStatement::Constraint(_) => child(
            "CONSTRAINT",
            "CONSTRAINT",
            format!("{} ON {}", ctx.quote(name), ctx.parent_name()),
        ),
        AnyStatement::Index(_) => child("INDEX", "INDEX", qualified),
        AnyStatement::Trigger(_) => child(
            "TRIGGER",
            "TRIGGER",
            format!("{} ON {}", ctx.quote(name), ctx.parent_name()),
        ),
        AnyStatement::Policy(_) => child(
            "POLICY",
            "POLICY",
            format!("{} ON {}", ctx.quote(name), ctx.parent_name()),
        ),
        AnyStatement::Statistics(_) => ObjectRef {
            levels: Vec::new(),
            ..child("STATISTICS", "STATISTICS", qualified)
        },
    }
}

/// Extended property levels of the owning table or view.
fn parent_levels(ctx: &SqlContext<'_>) -> Vec<(&'static str, String)> {
    let schema = ctx.id.schema.clone().unwrap_or_default();
    let table = ctx.id.table.clone().unwrap_or_default();
    let level = if ctx.parent_view().is_some() { "VIEW" } else { "TABLE" };
    vec![("SCHEMA", schema), (level, table)]
}

/// Creation and drop SQL of a statement.
pub trait Renderable {
    /// Complete, self-sufficient DDL creating the object, including owner,
    /// privileges and comment.
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript);

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript);
}

pub fn create_any(statement: AnyStatement<'_>, ctx: &SqlContext<'_>, script: &mut SqlScript) {
    with_statement!(statement, s => s.create_sql(ctx, script))
}

pub fn drop_any(statement: AnyStatement<'_>, ctx: &SqlContext<'_>, script: &mut SqlScript) {
    with_statement!(statement, s => s.drop_sql(ctx, script))
}

/// Owner, privileges and comment of a freshly created statement.
pub fn append_create_attributes(
    ctx: &SqlContext<'_>,
    statement: AnyStatement<'_>,
    script: &mut SqlScript,
) {
    let target = object_ref(ctx, statement);
    if !owner::owner_is_inline(ctx.dialect, statement.kind())
        && let Some(owner) = statement.owner()
        && let Some(sql) = owner::owner_sql(ctx, &target, Some(owner))
    {
        script.push(sql);
    }
    grant::append_privileges(
        ctx,
        &target,
        statement.owner(),
        statement.privileges(),
        script,
    );
    if let Some(comment) = statement.comment() {
        let action = CommentAction::SetComment {
            comment: comment.to_string(),
        };
        comment::append_comment(ctx, &target, &action, false, script);
    }
}

/// `DROP <keyword> [IF EXISTS] <name>`.
pub fn drop_statement(ctx: &SqlContext<'_>, keyword: &str, name: &str) -> String {
    format!("DROP {keyword}{} {name}", ctx.if_exists())
}

/// `key = value` pairs as used in `WITH (...)` option lists.
pub fn format_options(options: &BTreeMap<String, String>) -> String {
    options
        .iter()
        .map(|(k, v)| format!("{k} = {v}"))
        .join(", ")
}

/// PG `OPTIONS (key 'value', ...)` of foreign objects.
pub fn format_foreign_options(dialect: Dialect, options: &BTreeMap<String, String>) -> String {
    options
        .iter()
        .map(|(k, v)| format!("{k} {}", dialect.quote_literal(v)))
        .join(", ")
}

/// MS SQL batches that must precede a module body.
pub fn append_ms_module_settings(
    script: &mut SqlScript,
    quoted_identifier: Option<bool>,
    ansi_nulls: bool,
) {
    let on_off = |flag: bool| if flag { "ON" } else { "OFF" };
    if let Some(quoted) = quoted_identifier {
        script.push(format!("SET QUOTED_IDENTIFIER {}", on_off(quoted)));
    }
    script.push(format!("SET ANSI_NULLS {}", on_off(ansi_nulls)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_orders_by_slot() {
        let mut script = SqlScript::new();
        script.push("B");
        script.push_to(Slot::End, "C");
        script.push_to(Slot::Begin, "A");
        script.push("B2");

        let ordered: Vec<&str> = script.ordered().collect();
        assert_eq!(ordered, vec!["A", "B", "B2", "C"]);
    }

    #[test]
    fn test_to_sql_pg_wrappers() {
        let mut script = SqlScript::new();
        script.push("CREATE SCHEMA app");
        let settings = Settings {
            script_in_transaction: true,
            disable_check_function_bodies: true,
            ..Settings::default()
        };
        assert_eq!(
            script.to_sql(Dialect::Pg, &settings),
            "BEGIN;\n\nSET check_function_bodies = false;\n\nCREATE SCHEMA app;\n\nCOMMIT;"
        );
    }

    #[test]
    fn test_to_sql_ms_batches() {
        let mut script = SqlScript::new();
        script.push("CREATE SCHEMA [app]");
        let settings = Settings {
            disable_check_function_bodies: true,
            ..Settings::default()
        };
        assert_eq!(
            script.to_sql(Dialect::Ms, &settings),
            "CREATE SCHEMA [app]\nGO"
        );
    }

    #[test]
    fn test_guarded_do_block() {
        let settings = Settings {
            generate_exists_do_block: true,
            ..Settings::default()
        };
        let id = DbObjectId::in_schema(StatementType::Type, "public", "mood");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        assert_eq!(
            ctx.guarded("CREATE TYPE mood AS ENUM ('a')".to_string()),
            "DO $$\nBEGIN\n    CREATE TYPE mood AS ENUM ('a');\nEXCEPTION WHEN OTHERS THEN\n    null;\nEND;\n$$"
        );
    }
}
