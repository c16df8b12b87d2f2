use crate::catalog::AnyStatement;
use crate::catalog::statistics::Statistics;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::statistics::update_statistics_sql;
use crate::render::{SqlContext, SqlScript};

impl Diffable for Statistics {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        if self.columns != new.columns || self.filter != new.filter {
            return ObjectState::Recreate;
        }
        let start = script.len();

        if self.norecompute != new.norecompute
            || self.incremental != new.incremental
            || !self.compare_sample(new)
        {
            script.push(update_statistics_sql(ctx, self, new, new.name()));
        }

        append_attribute_alters(
            ctx,
            AnyStatement::Statistics(self),
            AnyStatement::Statistics(new),
            script,
        );
        ObjectState::after(start, script, false)
    }
}
