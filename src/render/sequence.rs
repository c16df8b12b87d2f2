//! SQL rendering for sequences

use crate::catalog::AnyStatement;
use crate::catalog::sequence::{Sequence, SequenceBody, SequenceOwner};
use crate::dialect::Dialect;
use crate::render::{
    Renderable, Slot, SqlContext, SqlScript, append_create_attributes, drop_statement,
};

fn bound_clause(keyword: &str, value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{keyword} {v}"),
        None => format!("NO {keyword}"),
    }
}

fn cache_clause(dialect: Dialect, cache: Option<i64>) -> Option<String> {
    match (dialect, cache) {
        (_, Some(cache)) => Some(format!("CACHE {cache}")),
        (Dialect::Ms, None) => Some("NO CACHE".to_string()),
        (Dialect::Pg, None) => None,
    }
}

fn cycle_clause(cycle: bool) -> String {
    let clause = if cycle { "CYCLE" } else { "NO CYCLE" };
    clause.to_string()
}

/// Clauses of `CREATE SEQUENCE` in canonical order.
fn create_clauses(dialect: Dialect, body: &SequenceBody) -> Vec<String> {
    let mut clauses = Vec::new();
    if let Some(data_type) = &body.data_type {
        clauses.push(format!("AS {data_type}"));
    }
    if let Some(start) = body.start {
        clauses.push(format!("START WITH {start}"));
    }
    if let Some(increment) = body.increment {
        clauses.push(format!("INCREMENT BY {increment}"));
    }
    clauses.push(bound_clause("MINVALUE", body.min_value));
    clauses.push(bound_clause("MAXVALUE", body.max_value));
    clauses.extend(cache_clause(dialect, body.cache));
    clauses.push(cycle_clause(body.cycle));
    clauses
}

/// Clauses of `ALTER SEQUENCE` for the attributes that differ. The data type
/// is alterable only on PostgreSQL; MS restarts instead of changing START.
pub fn alter_clauses(dialect: Dialect, old: &SequenceBody, new: &SequenceBody) -> Vec<String> {
    let mut clauses = Vec::new();
    if dialect == Dialect::Pg && old.data_type != new.data_type {
        // An unset type is the PG default.
        let data_type = new.data_type.as_deref().unwrap_or("bigint");
        clauses.push(format!("AS {data_type}"));
    }
    if old.increment != new.increment {
        clauses.push(format!("INCREMENT BY {}", new.increment.unwrap_or(1)));
    }
    if old.min_value != new.min_value {
        clauses.push(bound_clause("MINVALUE", new.min_value));
    }
    if old.max_value != new.max_value {
        clauses.push(bound_clause("MAXVALUE", new.max_value));
    }
    if old.start != new.start
        && let Some(start) = new.start
    {
        clauses.push(match dialect {
            Dialect::Pg => format!("START WITH {start}"),
            Dialect::Ms => format!("RESTART WITH {start}"),
        });
    }
    if old.cache != new.cache {
        clauses.push(
            cache_clause(dialect, new.cache).unwrap_or_else(|| "CACHE 1".to_string()),
        );
    }
    if old.cycle != new.cycle {
        clauses.push(cycle_clause(new.cycle));
    }
    clauses
}

pub fn owned_by_sql(ctx: &SqlContext<'_>, name: &str, owner: Option<&SequenceOwner>) -> String {
    let target = match owner {
        Some(owner) => format!(
            "{}.{}",
            ctx.dialect.quote_qualified(&owner.table.schema, &owner.table.name),
            ctx.quote(&owner.column)
        ),
        None => "NONE".to_string(),
    };
    format!("ALTER SEQUENCE {} OWNED BY {target}", ctx.qualified(name))
}

impl Renderable for Sequence {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let if_not_exists = match ctx.dialect {
            Dialect::Pg => ctx.if_not_exists(),
            Dialect::Ms => "",
        };
        script.push(format!(
            "CREATE SEQUENCE{if_not_exists} {} {}",
            ctx.qualified(self.name()),
            create_clauses(ctx.dialect, self).join(" ")
        ));
        // The owning column may be created later in the script.
        if let Some(owner) = &self.owned_by {
            script.push_to(Slot::End, owned_by_sql(ctx, self.name(), Some(owner)));
        }
        append_create_attributes(ctx, AnyStatement::Sequence(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "SEQUENCE", &ctx.qualified(self.name())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::{DbObjectId, QualifiedName, StatementType};
    use crate::config::Settings;

    #[test]
    fn test_pg_create_sequence() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Sequence, "public", "orders_id_seq");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let mut body = SequenceBody::new(1);
        body.data_type = Some("bigint".into());
        body.start = Some(1);
        body.max_value = Some(1000);
        body.owned_by = Some(SequenceOwner {
            table: QualifiedName::new("public", "orders"),
            column: "id".into(),
        });
        let sequence = Sequence::builder("orders_id_seq", body).build();

        let mut script = SqlScript::new();
        sequence.create_sql(&ctx, &mut script);
        let sql: Vec<&str> = script.ordered().collect();
        assert_eq!(
            sql,
            vec![
                "CREATE SEQUENCE public.orders_id_seq AS bigint START WITH 1 INCREMENT BY 1 NO MINVALUE MAXVALUE 1000 NO CYCLE",
                "ALTER SEQUENCE public.orders_id_seq OWNED BY public.orders.id",
            ]
        );
        assert_eq!(script.statements()[1].slot, Slot::End);
    }

    #[test]
    fn test_ms_create_sequence_no_cache() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Sequence, "dbo", "seq");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let sequence = Sequence::builder("seq", SequenceBody::new(5)).build();

        let mut script = SqlScript::new();
        sequence.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE SEQUENCE [dbo].[seq] INCREMENT BY 5 NO MINVALUE NO MAXVALUE NO CACHE NO CYCLE"
        );
    }

    #[test]
    fn test_alter_clauses_only_changed() {
        let mut old = SequenceBody::new(1);
        old.max_value = Some(1000);
        let mut new = old.clone();
        new.max_value = Some(2000);
        assert_eq!(alter_clauses(Dialect::Pg, &old, &new), vec!["MAXVALUE 2000"]);

        new.cache = Some(20);
        new.start = Some(10);
        assert_eq!(
            alter_clauses(Dialect::Ms, &old, &new),
            vec!["MAXVALUE 2000", "RESTART WITH 10", "CACHE 20"]
        );
    }

    #[test]
    fn test_alter_clauses_cleared_type_reverts_to_bigint() {
        let mut old = SequenceBody::new(1);
        old.data_type = Some("integer".into());
        let new = SequenceBody::new(1);
        assert_eq!(alter_clauses(Dialect::Pg, &old, &new), vec!["AS bigint"]);
        assert!(alter_clauses(Dialect::Ms, &old, &new).is_empty());
    }
}
