//! SQL rendering for tables.
//!
//! `CREATE TABLE` carries the column list only. Constraints, indexes and
//! the other children are separate steps ordered by the diff walker, which
//! lets foreign keys point at tables created later in the same script.

use crate::catalog::AnyStatement;
use crate::catalog::id::{DbObjectId, QualifiedName};
use crate::catalog::table::{MsTable, PgTable, PgTableKind, Table, TableFlavor};
use crate::dialect::Dialect;
use crate::render::column::{append_column_extras, column_definition};
use crate::render::{
    Renderable, Slot, SqlContext, SqlScript, append_create_attributes, append_ms_module_settings,
    drop_statement, format_foreign_options, format_options,
};

/// Qualified name of the table a context points at.
pub fn table_name(ctx: &SqlContext<'_>) -> String {
    ctx.qualified(&ctx.id.name)
}

pub fn qualified_name(dialect: Dialect, name: &QualifiedName) -> String {
    dialect.quote_qualified(&name.schema, &name.name)
}

pub fn rls_sql(ctx: &SqlContext<'_>, action: &str) -> String {
    format!("ALTER TABLE {} {action} ROW LEVEL SECURITY", table_name(ctx))
}

pub fn change_tracking_sql(ctx: &SqlContext<'_>, track_columns_updated: Option<bool>) -> String {
    match track_columns_updated {
        Some(track) => format!(
            "ALTER TABLE {} ENABLE CHANGE_TRACKING WITH (TRACK_COLUMNS_UPDATED = {})",
            table_name(ctx),
            if track { "ON" } else { "OFF" }
        ),
        None => format!("ALTER TABLE {} DISABLE CHANGE_TRACKING", table_name(ctx)),
    }
}

pub fn system_versioning_sql(ctx: &SqlContext<'_>, history: Option<&QualifiedName>) -> String {
    match history {
        Some(history) => format!(
            "ALTER TABLE {} SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = {}))",
            table_name(ctx),
            qualified_name(ctx.dialect, history)
        ),
        None => format!("ALTER TABLE {} SET (SYSTEM_VERSIONING = OFF)", table_name(ctx)),
    }
}

fn column_list(columns: &[String]) -> String {
    if columns.is_empty() {
        " ()".to_string()
    } else {
        format!(" (\n    {}\n)", columns.join(",\n    "))
    }
}

fn pg_create_sql(ctx: &SqlContext<'_>, table: &Table, pg: &PgTable) -> String {
    let mut sql = String::from("CREATE ");
    if matches!(pg.kind, PgTableKind::Foreign { .. }) {
        sql.push_str("FOREIGN ");
    } else if !pg.logged {
        sql.push_str("UNLOGGED ");
    }
    sql.push_str("TABLE");
    sql.push_str(ctx.if_not_exists());
    sql.push(' ');
    sql.push_str(&table_name(ctx));

    let columns: Vec<String> = table
        .local_columns()
        .map(|c| column_definition(ctx.dialect, c))
        .collect();

    // PARTITION OF / OF type / column list
    match &pg.kind {
        PgTableKind::Partition { parent, bound } => {
            sql.push_str(&format!(" PARTITION OF {}", qualified_name(ctx.dialect, parent)));
            sql.push('\n');
            sql.push_str(bound);
        }
        PgTableKind::Typed { of_type } => {
            sql.push_str(&format!(" OF {of_type}"));
        }
        _ => sql.push_str(&column_list(&columns)),
    }

    if !pg.inherits.is_empty() {
        let parents: Vec<String> = pg
            .inherits
            .iter()
            .map(|p| qualified_name(ctx.dialect, p))
            .collect();
        sql.push_str(&format!("\nINHERITS ({})", parents.join(", ")));
    }
    if let PgTableKind::Partitioned { partition_by } = &pg.kind {
        sql.push_str(&format!("\nPARTITION BY {partition_by}"));
    }
    if let Some(method) = &pg.access_method {
        sql.push_str(&format!("\nUSING {method}"));
    }
    if !table.options.is_empty() {
        sql.push_str(&format!("\nWITH ({})", format_options(&table.options)));
    }
    if let Some(tablespace) = &table.tablespace {
        sql.push_str(&format!("\nTABLESPACE {}", ctx.quote(tablespace)));
    }
    if let PgTableKind::Foreign { server } = &pg.kind {
        sql.push_str(&format!("\nSERVER {}", ctx.quote(server)));
        if !pg.foreign_options.is_empty() {
            sql.push_str(&format!(
                "\nOPTIONS ({})",
                format_foreign_options(ctx.dialect, &pg.foreign_options)
            ));
        }
    }
    if let Some(distribution) = &pg.distribution {
        sql.push('\n');
        sql.push_str(distribution);
    }
    sql
}

fn ms_create_sql(ctx: &SqlContext<'_>, table: &Table, ms: &MsTable) -> String {
    let mut columns: Vec<String> = table
        .columns()
        .iter()
        .map(|c| column_definition(ctx.dialect, c))
        .collect();
    if let Some((start, end)) = &ms.period {
        columns.push(format!(
            "PERIOD FOR SYSTEM_TIME ({}, {})",
            ctx.quote(start),
            ctx.quote(end)
        ));
    }

    let mut sql = format!("CREATE TABLE {}", table_name(ctx));
    sql.push_str(&column_list(&columns));
    if let Some(filegroup) = &table.tablespace {
        sql.push_str(&format!(" ON {}", ctx.quote(filegroup)));
    }
    if let Some(text_image) = &ms.text_image {
        sql.push_str(&format!(" TEXTIMAGE_ON {}", ctx.quote(text_image)));
    }
    if let Some(filestream) = &ms.filestream {
        sql.push_str(&format!(" FILESTREAM_ON {}", ctx.quote(filestream)));
    }
    if !table.options.is_empty() {
        sql.push_str(&format!("\nWITH ({})", format_options(&table.options)));
    }
    sql
}

/// Per-column follow-up statements: overrides, storage, privileges, comments.
fn append_columns(ctx: &SqlContext<'_>, table: &Table, script: &mut SqlScript) {
    for column in table.columns() {
        let id = DbObjectId::column(ctx.schema(), table.name(), column.name());
        let column_ctx = SqlContext::new(&id, ctx.dialect, ctx.settings)
            .with_parent(Some(AnyStatement::Table(table)));
        append_column_extras(&column_ctx, column, script);
    }
}

impl Renderable for Table {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        match &self.flavor {
            TableFlavor::Pg(pg) => {
                script.push(pg_create_sql(ctx, self, pg));
                append_columns(ctx, self, script);
                if pg.rls_enabled {
                    script.push(rls_sql(ctx, "ENABLE"));
                }
                if pg.rls_forced {
                    script.push(rls_sql(ctx, "FORCE"));
                }
            }
            TableFlavor::Ms(ms) => {
                append_ms_module_settings(script, None, ms.ansi_nulls);
                script.push(ms_create_sql(ctx, self, ms));
                append_columns(ctx, self, script);
                // Both need the primary key, which is created as a separate step.
                if ms.tracked.is_some() {
                    script.push_to(Slot::End, change_tracking_sql(ctx, ms.tracked));
                }
                if let Some(history) = &ms.history_table {
                    script.push_to(Slot::End, system_versioning_sql(ctx, Some(history)));
                }
            }
        }
        append_create_attributes(ctx, AnyStatement::Table(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        if self.ms_attrs().is_some_and(|ms| ms.history_table.is_some()) {
            script.push(system_versioning_sql(ctx, None));
        }
        let keyword = if self.is_foreign() { "FOREIGN TABLE" } else { "TABLE" };
        script.push(drop_statement(ctx, keyword, &table_name(ctx)));
    }
}
