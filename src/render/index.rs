//! SQL rendering for CREATE INDEX / DROP INDEX.

use tracing::warn;

use crate::catalog::AnyStatement;
use crate::catalog::index::{Index, IndexColumn};
use crate::dialect::Dialect;
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes, format_options};

fn column_spec(dialect: Dialect, col: &IndexColumn) -> String {
    let mut spec = if col.is_expression {
        format!("({})", col.expression)
    } else {
        dialect.quote_ident(&col.expression)
    };

    // Add collation if specified
    if let Some(collation) = &col.collation {
        spec.push_str(&format!(" COLLATE {collation}"));
    }

    // Add operator class if specified
    if let Some(opclass) = &col.opclass {
        spec.push_str(&format!(" {opclass}"));
    }

    if col.descending {
        spec.push_str(" DESC");
    }
    match col.nulls_first {
        Some(true) => spec.push_str(" NULLS FIRST"),
        Some(false) => spec.push_str(" NULLS LAST"),
        None => {}
    }
    spec
}

/// Whether PG `CONCURRENTLY` may be used. It cannot run inside a transaction
/// block, so a transactional script falls back to a plain build.
pub fn use_concurrently(ctx: &SqlContext<'_>) -> bool {
    if !ctx.settings.concurrently || ctx.dialect != Dialect::Pg {
        return false;
    }
    if ctx.settings.script_in_transaction {
        warn!(
            "CONCURRENTLY requested for {} inside a transactional script; building without it",
            ctx.id
        );
        return false;
    }
    true
}

fn pg_create_sql(ctx: &SqlContext<'_>, index: &Index) -> String {
    let mut sql = String::new();

    // CREATE [UNIQUE] INDEX [CONCURRENTLY] [IF NOT EXISTS] name
    sql.push_str("CREATE ");
    if index.unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX");
    if use_concurrently(ctx) && !index.only {
        sql.push_str(" CONCURRENTLY");
    }
    sql.push_str(ctx.if_not_exists());
    sql.push(' ');
    sql.push_str(&ctx.quote(index.name()));

    // ON [ONLY] table_name
    sql.push_str(" ON ");
    if index.only {
        sql.push_str("ONLY ");
    }
    sql.push_str(&ctx.parent_name());

    if let Some(method) = &index.method {
        sql.push_str(&format!(" USING {method}"));
    }

    let columns: Vec<String> = index.columns.iter().map(|c| column_spec(ctx.dialect, c)).collect();
    sql.push_str(&format!(" ({})", columns.join(", ")));

    // Add INCLUDE clause if there are included columns
    if !index.include.is_empty() {
        sql.push_str(&format!(" INCLUDE ({})", ctx.dialect.quote_list(&index.include)));
    }
    if index.nulls_not_distinct {
        sql.push_str(" NULLS NOT DISTINCT");
    }
    if !index.options.is_empty() {
        sql.push_str(&format!(" WITH ({})", format_options(&index.options)));
    }
    if let Some(tablespace) = &index.tablespace {
        sql.push_str(&format!(" TABLESPACE {}", ctx.quote(tablespace)));
    }
    if let Some(predicate) = &index.predicate {
        sql.push_str(&format!(" WHERE {predicate}"));
    }
    sql
}

fn ms_create_sql(ctx: &SqlContext<'_>, index: &Index) -> String {
    let mut sql = String::from("CREATE ");
    if index.unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str(if index.clustered { "CLUSTERED " } else { "NONCLUSTERED " });
    if index.columnstore {
        sql.push_str("COLUMNSTORE ");
    }
    sql.push_str(&format!("INDEX {} ON {}", ctx.quote(index.name()), ctx.parent_name()));

    // A clustered columnstore index covers the whole table.
    if !(index.columnstore && index.clustered) {
        let columns: Vec<String> = index.columns.iter().map(|c| column_spec(ctx.dialect, c)).collect();
        sql.push_str(&format!(" ({})", columns.join(", ")));
    }
    if !index.include.is_empty() {
        sql.push_str(&format!(" INCLUDE ({})", ctx.dialect.quote_list(&index.include)));
    }
    if let Some(predicate) = &index.predicate {
        sql.push_str(&format!(" WHERE {predicate}"));
    }

    let mut options: Vec<String> = index
        .options
        .iter()
        .map(|(k, v)| format!("{k} = {v}"))
        .collect();
    if ctx.settings.concurrently {
        options.push("ONLINE = ON".to_string());
    }
    if !options.is_empty() {
        sql.push_str(&format!(" WITH ({})", options.join(", ")));
    }
    if let Some(filegroup) = &index.tablespace {
        sql.push_str(&format!(" ON {}", ctx.quote(filegroup)));
    }
    sql
}

pub fn cluster_sql(ctx: &SqlContext<'_>, index: Option<&str>) -> String {
    match index {
        Some(name) => format!("{} CLUSTER ON {}", ctx.alter_parent(false), ctx.quote(name)),
        None => format!("{} SET WITHOUT CLUSTER", ctx.alter_parent(false)),
    }
}

impl Renderable for Index {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        match ctx.dialect {
            Dialect::Pg => {
                script.push(pg_create_sql(ctx, self));
                if self.clustered {
                    script.push(cluster_sql(ctx, Some(self.name())));
                }
            }
            Dialect::Ms => script.push(ms_create_sql(ctx, self)),
        }
        append_create_attributes(ctx, AnyStatement::Index(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let sql = match ctx.dialect {
            Dialect::Pg => {
                let concurrently = if use_concurrently(ctx) { " CONCURRENTLY" } else { "" };
                format!(
                    "DROP INDEX{concurrently}{} {}",
                    ctx.if_exists(),
                    ctx.qualified(self.name())
                )
            }
            Dialect::Ms => format!(
                "DROP INDEX{} {} ON {}",
                ctx.if_exists(),
                ctx.quote(self.name()),
                ctx.parent_name()
            ),
        };
        script.push(sql);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::{DbObjectId, StatementType};
    use crate::catalog::index::IndexBody;
    use crate::config::Settings;

    fn make_test_index() -> Index {
        let mut body = IndexBody::on(["email"]).unique();
        body.method = Some("btree".into());
        body.columns.push(IndexColumn::expression("lower(name)").desc());
        body.include = vec!["id".into()];
        body.predicate = Some("deleted_at IS NULL".into());
        Index::builder("users_email_idx", body).build()
    }

    #[test]
    fn test_pg_create_index() {
        let settings = Settings {
            concurrently: true,
            ..Settings::default()
        };
        let id = DbObjectId::table_child(StatementType::Index, "public", "users", "users_email_idx");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);

        let mut script = SqlScript::new();
        make_test_index().create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE UNIQUE INDEX CONCURRENTLY users_email_idx ON public.users USING btree \
             (email, (lower(name)) DESC) INCLUDE (id) WHERE deleted_at IS NULL"
        );

        let mut script = SqlScript::new();
        make_test_index().drop_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "DROP INDEX CONCURRENTLY public.users_email_idx"
        );
    }

    #[test]
    fn test_concurrently_dropped_in_transaction() {
        let settings = Settings {
            concurrently: true,
            script_in_transaction: true,
            ..Settings::default()
        };
        let id = DbObjectId::table_child(StatementType::Index, "public", "users", "users_email_idx");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        assert!(!use_concurrently(&ctx));
    }

    #[test]
    fn test_ms_create_index() {
        let settings = Settings {
            concurrently: true,
            drop_if_exists: true,
            ..Settings::default()
        };
        let id = DbObjectId::table_child(StatementType::Index, "dbo", "users", "IX_users_email");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let mut body = IndexBody::on(["email"]);
        body.tablespace = Some("INDEXES".into());
        body.options.insert("FILLFACTOR".into(), "80".into());
        let index = Index::builder("IX_users_email", body).build();

        let mut script = SqlScript::new();
        index.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE NONCLUSTERED INDEX [IX_users_email] ON [dbo].[users] ([email]) \
             WITH (FILLFACTOR = 80, ONLINE = ON) ON [INDEXES]"
        );

        let mut script = SqlScript::new();
        index.drop_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "DROP INDEX IF EXISTS [IX_users_email] ON [dbo].[users]"
        );
    }
}
