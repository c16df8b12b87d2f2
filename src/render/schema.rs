//! SQL rendering for schemas.

use crate::catalog::AnyStatement;
use crate::catalog::schema::Schema;
use crate::dialect::Dialect;
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes, drop_statement};

impl Renderable for Schema {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let name = ctx.quote(self.name());
        let sql = match ctx.dialect {
            Dialect::Pg => format!("CREATE SCHEMA{} {name}", ctx.if_not_exists()),
            Dialect::Ms => match self.owner() {
                Some(owner) => format!("CREATE SCHEMA {name} AUTHORIZATION {}", ctx.quote(owner)),
                None => format!("CREATE SCHEMA {name}"),
            },
        };
        script.push(sql);
        append_create_attributes(ctx, AnyStatement::Schema(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "SCHEMA", &ctx.quote(self.name())));
    }
}
