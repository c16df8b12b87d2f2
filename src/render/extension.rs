use crate::catalog::AnyStatement;
use crate::catalog::extension::Extension;
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes, drop_statement};

impl Renderable for Extension {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let mut sql = format!("CREATE EXTENSION{} {}", ctx.if_not_exists(), ctx.quote(self.name()));
        if let Some(schema) = &self.schema {
            sql.push_str(&format!(" SCHEMA {}", ctx.quote(schema)));
        }
        script.push(sql);
        append_create_attributes(ctx, AnyStatement::Extension(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "EXTENSION", &ctx.quote(self.name())));
    }
}
