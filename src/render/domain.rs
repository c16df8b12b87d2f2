//! SQL rendering for PostgreSQL domains

use crate::catalog::AnyStatement;
use crate::catalog::domain::{Domain, DomainCheckConstraint};
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes, drop_statement};

fn alter_domain(ctx: &SqlContext<'_>) -> String {
    format!("ALTER DOMAIN {}", ctx.qualified(&ctx.id.name))
}

pub fn set_default_sql(ctx: &SqlContext<'_>, default: Option<&str>) -> String {
    match default {
        Some(expr) => format!("{} SET DEFAULT {expr}", alter_domain(ctx)),
        None => format!("{} DROP DEFAULT", alter_domain(ctx)),
    }
}

pub fn not_null_sql(ctx: &SqlContext<'_>, not_null: bool) -> String {
    let action = if not_null { "SET" } else { "DROP" };
    format!("{} {action} NOT NULL", alter_domain(ctx))
}

pub fn add_constraint_sql(ctx: &SqlContext<'_>, name: &str, check: &DomainCheckConstraint) -> String {
    let not_valid = if check.not_valid { " NOT VALID" } else { "" };
    format!(
        "{} ADD CONSTRAINT {} CHECK ({}){not_valid}",
        alter_domain(ctx),
        ctx.quote(name),
        check.expression
    )
}

pub fn drop_constraint_sql(ctx: &SqlContext<'_>, name: &str) -> String {
    format!(
        "{} DROP CONSTRAINT{} {}",
        alter_domain(ctx),
        ctx.if_exists(),
        ctx.quote(name)
    )
}

pub fn validate_constraint_sql(ctx: &SqlContext<'_>, name: &str) -> String {
    format!("{} VALIDATE CONSTRAINT {}", alter_domain(ctx), ctx.quote(name))
}

impl Renderable for Domain {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let mut sql = format!("CREATE DOMAIN {} AS {}", ctx.qualified(self.name()), self.base_type);
        if let Some(collation) = &self.collation {
            sql.push_str(&format!(" COLLATE {collation}"));
        }
        if let Some(default) = &self.default {
            sql.push_str(&format!(" DEFAULT {default}"));
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        // NOT VALID is only accepted by ALTER DOMAIN ADD CONSTRAINT.
        for (name, check) in self.constraints.iter().filter(|(_, c)| !c.not_valid) {
            sql.push_str(&format!(
                "\n    CONSTRAINT {} CHECK ({})",
                ctx.quote(name),
                check.expression
            ));
        }
        script.push(ctx.guarded(sql));
        for (name, check) in self.constraints.iter().filter(|(_, c)| c.not_valid) {
            script.push(add_constraint_sql(ctx, name, check));
        }
        append_create_attributes(ctx, AnyStatement::Domain(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "DOMAIN", &ctx.qualified(self.name())));
    }
}
