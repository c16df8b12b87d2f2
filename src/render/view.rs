//! SQL rendering for views and materialized views

use crate::catalog::AnyStatement;
use crate::catalog::view::{MsView, PgView, View};
use crate::dialect::Dialect;
use crate::render::{
    Renderable, SqlContext, SqlScript, append_create_attributes, append_ms_module_settings,
    drop_statement, format_options,
};

fn column_list(ctx: &SqlContext<'_>, view: &View) -> String {
    if view.column_names.is_empty() {
        String::new()
    } else {
        format!(" ({})", ctx.dialect.quote_list(&view.column_names))
    }
}

/// `CREATE [OR REPLACE] [MATERIALIZED] VIEW ... AS query`.
pub fn pg_definition(ctx: &SqlContext<'_>, view: &View, pg: &PgView, replace: bool) -> String {
    let or_replace = if replace && !pg.materialized { " OR REPLACE" } else { "" };
    // Only materialized views accept IF NOT EXISTS.
    let if_not_exists = if pg.materialized { ctx.if_not_exists() } else { "" };
    let mut sql = format!(
        "CREATE{or_replace} {}{if_not_exists} {}",
        view.keyword(),
        ctx.qualified(view.name())
    );
    sql.push_str(&column_list(ctx, view));
    if !pg.options.is_empty() {
        sql.push_str(&format!(" WITH ({})", format_options(&pg.options)));
    }
    if pg.materialized
        && let Some(tablespace) = &pg.tablespace
    {
        sql.push_str(&format!(" TABLESPACE {}", ctx.quote(tablespace)));
    }
    sql.push_str(" AS\n");
    sql.push_str(pg.query.trim_end().trim_end_matches(';'));
    if pg.materialized && !pg.with_data {
        sql.push_str("\nWITH NO DATA");
    }
    sql
}

/// `verb` is `CREATE` or `ALTER`; both share the same module text.
pub fn ms_definition(ctx: &SqlContext<'_>, view: &View, ms: &MsView, verb: &str) -> String {
    let mut sql = format!("{verb} VIEW {}", ctx.qualified(view.name()));
    sql.push_str(&column_list(ctx, view));
    if !ms.options.is_empty() {
        sql.push_str(&format!("\nWITH {}", ms.options.join(", ")));
    }
    sql.push_str("\nAS\n");
    sql.push_str(ms.query.trim_end());
    if ms.with_check_option {
        sql.push_str("\nWITH CHECK OPTION");
    }
    sql
}

pub fn column_default_sql(ctx: &SqlContext<'_>, view: &View, column: &str, default: Option<&str>) -> String {
    let action = match default {
        Some(expr) => format!("SET DEFAULT {expr}"),
        None => "DROP DEFAULT".to_string(),
    };
    format!(
        "ALTER VIEW {} ALTER COLUMN {} {action}",
        ctx.qualified(view.name()),
        ctx.quote(column)
    )
}

pub fn column_comment_sql(ctx: &SqlContext<'_>, view: &View, column: &str, comment: Option<&str>) -> String {
    let value = comment.map_or_else(|| "NULL".to_string(), |c| ctx.literal(c));
    format!(
        "COMMENT ON COLUMN {}.{} IS {value}",
        ctx.qualified(view.name()),
        ctx.quote(column)
    )
}

/// Defaults and column comments that live outside the view definition.
pub fn append_pg_column_attributes(ctx: &SqlContext<'_>, view: &View, pg: &PgView, script: &mut SqlScript) {
    for (column, default) in &pg.column_defaults {
        script.push(column_default_sql(ctx, view, column, Some(default)));
    }
    for (column, comment) in &pg.column_comments {
        script.push_to(
            ctx.comment_slot(),
            column_comment_sql(ctx, view, column, Some(comment)),
        );
    }
}

impl Renderable for View {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        if let Some(pg) = self.pg_attrs() {
            script.push(pg_definition(ctx, self, pg, false));
            append_pg_column_attributes(ctx, self, pg, script);
        } else if let Some(ms) = self.ms_attrs() {
            append_ms_module_settings(script, Some(ms.quoted_identifier), ms.ansi_nulls);
            script.push(ms_definition(ctx, self, ms, "CREATE"));
        }
        append_create_attributes(ctx, AnyStatement::View(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let keyword = match ctx.dialect {
            Dialect::Pg => self.keyword(),
            Dialect::Ms => "VIEW",
        };
        script.push(drop_statement(ctx, keyword, &ctx.qualified(self.name())));
    }
}
