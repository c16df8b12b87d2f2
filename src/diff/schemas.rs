use crate::catalog::AnyStatement;
use crate::catalog::extension::Extension;
use crate::catalog::schema::Schema;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::{SqlContext, SqlScript};

/// Contained objects are diffed on their own; a schema only carries its
/// owner, comment and grants.
impl Diffable for Schema {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let start = script.len();
        append_attribute_alters(ctx, AnyStatement::Schema(self), AnyStatement::Schema(new), script);
        ObjectState::after(start, script, false)
    }
}

impl Diffable for Extension {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let start = script.len();
        if self.schema != new.schema
            && let Some(schema) = &new.schema
        {
            script.push(format!(
                "ALTER EXTENSION {} SET SCHEMA {}",
                ctx.quote(new.name()),
                ctx.quote(schema)
            ));
        }
        append_attribute_alters(ctx, AnyStatement::Extension(self), AnyStatement::Extension(new), script);
        ObjectState::after(start, script, false)
    }
}
