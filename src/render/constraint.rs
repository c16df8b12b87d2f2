//! SQL rendering for table constraints.

use crate::catalog::AnyStatement;
use crate::catalog::constraint::{Constraint, ConstraintBody, ConstraintType, KeyConstraint};
use crate::dialect::Dialect;
use crate::render::table::qualified_name;
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes, format_options};

fn key_sql(dialect: Dialect, keyword: &str, key: &KeyConstraint) -> String {
    let mut sql = String::from(keyword);
    if dialect == Dialect::Ms {
        match key.clustered {
            Some(true) => sql.push_str(" CLUSTERED"),
            Some(false) => sql.push_str(" NONCLUSTERED"),
            None => {}
        }
    }
    if key.nulls_not_distinct {
        sql.push_str(" NULLS NOT DISTINCT");
    }

    let columns: Vec<String> = key
        .columns
        .iter()
        .map(|c| {
            let name = dialect.quote_ident(&c.name);
            match (dialect, c.descending) {
                (Dialect::Ms, true) => format!("{name} DESC"),
                _ => name,
            }
        })
        .collect();
    sql.push_str(&format!(" ({})", columns.join(", ")));

    if !key.include.is_empty() {
        sql.push_str(&format!(" INCLUDE ({})", dialect.quote_list(&key.include)));
    }
    if !key.options.is_empty() {
        sql.push_str(&format!(" WITH ({})", format_options(&key.options)));
    }
    if let Some(tablespace) = &key.tablespace {
        match dialect {
            Dialect::Pg => {
                sql.push_str(&format!(" USING INDEX TABLESPACE {}", dialect.quote_ident(tablespace)))
            }
            Dialect::Ms => sql.push_str(&format!(" ON {}", dialect.quote_ident(tablespace))),
        }
    }
    sql
}

/// Constraint definition after `ADD CONSTRAINT name`.
pub fn constraint_definition(dialect: Dialect, body: &ConstraintBody) -> String {
    let mut sql = match &body.constraint_type {
        ConstraintType::PrimaryKey(key) => key_sql(dialect, "PRIMARY KEY", key),
        ConstraintType::Unique(key) => key_sql(dialect, "UNIQUE", key),
        ConstraintType::ForeignKey(fk) => {
            let mut sql = format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                dialect.quote_list(&fk.columns),
                qualified_name(dialect, &fk.foreign_table),
                dialect.quote_list(&fk.foreign_columns)
            );
            if let Some(match_type) = &fk.match_type {
                sql.push_str(&format!(" MATCH {match_type}"));
            }
            if let Some(action) = &fk.on_update {
                sql.push_str(&format!(" ON UPDATE {action}"));
            }
            if let Some(action) = &fk.on_delete {
                sql.push_str(&format!(" ON DELETE {action}"));
            }
            if body.not_for_replication {
                sql.push_str(" NOT FOR REPLICATION");
            }
            sql
        }
        ConstraintType::Check {
            expression,
            no_inherit,
        } => {
            let mut sql = String::from("CHECK");
            if body.not_for_replication {
                sql.push_str(" NOT FOR REPLICATION");
            }
            sql.push_str(&format!(" ({expression})"));
            if *no_inherit {
                sql.push_str(" NO INHERIT");
            }
            sql
        }
        ConstraintType::Exclusion {
            index_method,
            elements,
            predicate,
        } => {
            let mut sql = format!("EXCLUDE USING {index_method} ({})", elements.join(", "));
            if let Some(predicate) = predicate {
                sql.push_str(&format!(" WHERE ({predicate})"));
            }
            sql
        }
    };

    if dialect == Dialect::Pg {
        sql.push_str(&deferrable_sql(body));
        if body.not_valid {
            sql.push_str(" NOT VALID");
        }
    }
    sql
}

/// ` DEFERRABLE [INITIALLY DEFERRED]`, empty for immediate constraints.
pub fn deferrable_sql(body: &ConstraintBody) -> String {
    match (body.deferrable, body.initially_deferred) {
        (false, _) => String::new(),
        (true, false) => " DEFERRABLE".to_string(),
        (true, true) => " DEFERRABLE INITIALLY DEFERRED".to_string(),
    }
}

pub fn ms_check_state_sql(ctx: &SqlContext<'_>, name: &str, disabled: bool, trusted: bool) -> String {
    let table = ctx.alter_parent(false);
    let name = ctx.quote(name);
    match (disabled, trusted) {
        (true, _) => format!("{table} NOCHECK CONSTRAINT {name}"),
        (false, true) => format!("{table} WITH CHECK CHECK CONSTRAINT {name}"),
        (false, false) => format!("{table} CHECK CONSTRAINT {name}"),
    }
}

impl Renderable for Constraint {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let name = ctx.quote(self.name());
        let definition = constraint_definition(ctx.dialect, self);
        match ctx.dialect {
            Dialect::Pg => {
                let sql = format!("{} ADD CONSTRAINT {name} {definition}", ctx.alter_parent(false));
                script.push(ctx.guarded(sql));
            }
            Dialect::Ms => {
                let nocheck = if self.not_valid { " WITH NOCHECK" } else { "" };
                script.push(format!(
                    "{}{nocheck} ADD CONSTRAINT {name} {definition}",
                    ctx.alter_parent(false)
                ));
                if self.disabled {
                    script.push(ms_check_state_sql(ctx, self.name(), true, false));
                }
            }
        }
        append_create_attributes(ctx, AnyStatement::Constraint(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(format!(
            "{} DROP CONSTRAINT{} {}",
            ctx.alter_parent(false),
            ctx.if_exists(),
            ctx.quote(self.name())
        ));
    }
}
