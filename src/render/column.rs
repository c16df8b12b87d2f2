//! Column definitions and standalone column statements.

use crate::catalog::AnyStatement;
use crate::catalog::column::{Column, ColumnFlavor, Identity, IdentityOptions, MsColumn, PgColumn, RowPeriod};
use crate::dialect::Dialect;
use crate::render::{
    Renderable, SqlContext, SqlScript, append_create_attributes, format_foreign_options,
    format_options,
};

/// `(START WITH 1 INCREMENT BY 1 ...)` of a PG identity, empty when no option is set.
pub fn identity_options_sql(options: &IdentityOptions) -> String {
    let mut parts = Vec::new();
    if let Some(start) = options.start {
        parts.push(format!("START WITH {start}"));
    }
    if let Some(increment) = options.increment {
        parts.push(format!("INCREMENT BY {increment}"));
    }
    if let Some(min) = options.min_value {
        parts.push(format!("MINVALUE {min}"));
    }
    if let Some(max) = options.max_value {
        parts.push(format!("MAXVALUE {max}"));
    }
    if let Some(cache) = options.cache {
        parts.push(format!("CACHE {cache}"));
    }
    if options.cycle {
        parts.push("CYCLE".to_string());
    }
    parts.join(" ")
}

pub fn pg_identity_sql(always: bool, options: &IdentityOptions) -> String {
    let mut sql = format!(
        "GENERATED {} AS IDENTITY",
        if always { "ALWAYS" } else { "BY DEFAULT" }
    );
    let options = identity_options_sql(options);
    if !options.is_empty() {
        sql.push_str(&format!(" ({options})"));
    }
    sql
}

/// Column definition as used inside `CREATE TABLE` and `ADD COLUMN`.
pub fn column_definition(dialect: Dialect, column: &Column) -> String {
    match &column.flavor {
        ColumnFlavor::Pg(pg) => pg_definition(column, pg),
        ColumnFlavor::Ms(ms) => ms_definition(dialect, column, ms),
    }
}

fn pg_definition(column: &Column, pg: &PgColumn) -> String {
    let dialect = Dialect::Pg;
    let mut sql = format!("{} {}", dialect.quote_ident(column.name()), column.data_type);

    if !pg.foreign_options.is_empty() {
        sql.push_str(&format!(
            " OPTIONS ({})",
            format_foreign_options(dialect, &pg.foreign_options)
        ));
    }
    if let Some(compression) = &pg.compression {
        sql.push_str(&format!(" COMPRESSION {compression}"));
    }
    if let Some(collation) = &column.collation {
        sql.push_str(&format!(" COLLATE {collation}"));
    }
    if let Some(generated) = &column.generated {
        sql.push_str(&format!(" GENERATED ALWAYS AS ({}) STORED", generated.expression));
    }
    if let Some(Identity::Pg { always, options }) = &column.identity {
        sql.push(' ');
        sql.push_str(&pg_identity_sql(*always, options));
    }
    if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    sql
}

fn ms_definition(dialect: Dialect, column: &Column, ms: &MsColumn) -> String {
    let name = dialect.quote_ident(column.name());

    // Computed columns carry no type.
    if let Some(generated) = &column.generated {
        let mut sql = format!("{name} AS {}", generated.expression);
        if generated.stored {
            sql.push_str(" PERSISTED");
            if column.not_null {
                sql.push_str(" NOT NULL");
            }
        }
        return sql;
    }

    let mut sql = format!("{name} {}", column.data_type);
    if ms.filestream {
        sql.push_str(" FILESTREAM");
    }
    if let Some(collation) = &column.collation {
        sql.push_str(&format!(" COLLATE {collation}"));
    }
    if ms.sparse {
        sql.push_str(" SPARSE");
    }
    if let Some(function) = &ms.masking {
        sql.push_str(&format!(" MASKED WITH (FUNCTION = {})", dialect.quote_literal(function)));
    }
    if let Some(default) = &column.default {
        if let Some(constraint) = &ms.default_name {
            sql.push_str(&format!(" CONSTRAINT {}", dialect.quote_ident(constraint)));
        }
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    if let Some(Identity::Ms { seed, increment }) = &column.identity {
        sql.push_str(&format!(" IDENTITY({seed},{increment})"));
        if ms.not_for_replication {
            sql.push_str(" NOT FOR REPLICATION");
        }
    }
    if let Some(period) = ms.period {
        sql.push_str(match period {
            RowPeriod::Start => " GENERATED ALWAYS AS ROW START",
            RowPeriod::End => " GENERATED ALWAYS AS ROW END",
        });
        if ms.hidden {
            sql.push_str(" HIDDEN");
        }
    }
    sql.push_str(if column.not_null { " NOT NULL" } else { " NULL" });
    if ms.rowguidcol {
        sql.push_str(" ROWGUIDCOL");
    }
    sql
}

/// `ALTER TABLE [ONLY] t ALTER COLUMN c <action>` on PostgreSQL,
/// `ALTER TABLE t ALTER COLUMN c <action>` on MS SQL.
pub fn alter_column_sql(ctx: &SqlContext<'_>, only: bool, column: &str, action: &str) -> String {
    format!(
        "{} ALTER COLUMN {} {action}",
        ctx.alter_parent(only),
        ctx.quote(column)
    )
}

/// Statement removing the default of an MS column, looking up the
/// system-generated constraint name when the default is unnamed.
pub fn ms_drop_default_sql(ctx: &SqlContext<'_>, column: &str, default_name: Option<&str>) -> String {
    let table = ctx.parent_name();
    if let Some(name) = default_name {
        return format!("{} DROP CONSTRAINT {}", ctx.alter_parent(false), ctx.quote(name));
    }
    let drop = ctx.literal(&format!("ALTER TABLE {table} DROP CONSTRAINT "));
    format!(
        "DECLARE @default_name sysname\n\
         SELECT @default_name = dc.name FROM sys.default_constraints dc\n\
         JOIN sys.columns c ON c.object_id = dc.parent_object_id AND c.column_id = dc.parent_column_id\n\
         WHERE dc.parent_object_id = OBJECT_ID({}) AND c.name = {}\n\
         IF @default_name IS NOT NULL\n    EXEC({drop} + QUOTENAME(@default_name))",
        ctx.literal(&table),
        ctx.literal(column)
    )
}

/// PG per-column settings that have no place in the column definition.
pub fn append_pg_column_settings(
    ctx: &SqlContext<'_>,
    column: &Column,
    pg: &PgColumn,
    script: &mut SqlScript,
) {
    let name = column.name();
    if let Some(storage) = &pg.storage {
        script.push(alter_column_sql(ctx, true, name, &format!("SET STORAGE {storage}")));
    }
    if let Some(statistics) = pg.statistics {
        script.push(alter_column_sql(ctx, true, name, &format!("SET STATISTICS {statistics}")));
    }
    if !pg.options.is_empty() {
        script.push(alter_column_sql(
            ctx,
            true,
            name,
            &format!("SET ({})", format_options(&pg.options)),
        ));
    }
}

/// Local `DEFAULT`/`NOT NULL` overrides of a column inherited from a parent.
pub fn append_inherited_overrides(ctx: &SqlContext<'_>, column: &Column, script: &mut SqlScript) {
    if let Some(default) = &column.default {
        script.push(alter_column_sql(ctx, true, column.name(), &format!("SET DEFAULT {default}")));
    }
    if column.not_null {
        script.push(alter_column_sql(ctx, true, column.name(), "SET NOT NULL"));
    }
}

/// Everything a column needs after its definition is in place.
pub fn append_column_extras(ctx: &SqlContext<'_>, column: &Column, script: &mut SqlScript) {
    if let Some(pg) = column.pg_attrs() {
        if pg.inherited {
            append_inherited_overrides(ctx, column, script);
        }
        append_pg_column_settings(ctx, column, pg, script);
    }
    append_create_attributes(ctx, AnyStatement::Column(column), script);
}

impl Renderable for Column {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        if !self.is_inherited() {
            let keyword = match ctx.dialect {
                Dialect::Pg => "ADD COLUMN",
                Dialect::Ms => "ADD",
            };
            script.push(format!(
                "{} {keyword} {}",
                ctx.alter_parent(false),
                column_definition(ctx.dialect, self)
            ));
        }
        append_column_extras(ctx, self, script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        if self.is_inherited() {
            return;
        }
        if let Some(ms) = self.ms_attrs()
            && self.default.is_some()
        {
            script.push(ms_drop_default_sql(ctx, self.name(), ms.default_name.as_deref()));
        }
        script.push(format!(
            "{} DROP COLUMN{} {}",
            ctx.alter_parent(false),
            ctx.if_exists(),
            ctx.quote(self.name())
        ));
    }
}
