use crate::catalog::AnyStatement;
use crate::catalog::assembly::Assembly;
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes, drop_statement};

pub fn visibility_sql(ctx: &SqlContext<'_>, name: &str, visible: bool) -> String {
    format!(
        "ALTER ASSEMBLY {} WITH VISIBILITY = {}",
        ctx.quote(name),
        if visible { "ON" } else { "OFF" }
    )
}

impl Renderable for Assembly {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        // Binary literals go in as written, file paths as string literals.
        let sources = self
            .binaries
            .iter()
            .map(|b| {
                if b.starts_with("0x") {
                    b.clone()
                } else {
                    ctx.literal(b)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        script.push(format!(
            "CREATE ASSEMBLY {}\nFROM {sources}\nWITH PERMISSION_SET = {}",
            ctx.quote(self.name()),
            self.permission_set
        ));
        if !self.visible {
            script.push(visibility_sql(ctx, self.name(), false));
        }
        append_create_attributes(ctx, AnyStatement::Assembly(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "ASSEMBLY", &ctx.quote(self.name())));
    }
}
