use crate::catalog::AnyStatement;
use crate::catalog::triggers::{Trigger, TriggerState};
use crate::dialect::Dialect;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::trigger::{append_ms_definition, state_sql};
use crate::render::{SqlContext, SqlScript};

impl Diffable for Trigger {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let redefined = !self.same_definition(new);
        let start = script.len();

        match (ctx.dialect, new.ms_attrs()) {
            (Dialect::Ms, Some(ms)) if self.ms_attrs().is_some() => {
                if redefined {
                    append_ms_definition(ctx, new, ms, "ALTER", script);
                }
                let disabled = new.state == TriggerState::Disabled;
                if self.state != new.state || (redefined && disabled) {
                    script.push(state_sql(ctx, new.name(), new.state));
                }
            }
            _ => {
                if redefined {
                    return ObjectState::Recreate;
                }
                if self.state != new.state {
                    script.push(state_sql(ctx, new.name(), new.state));
                }
            }
        }

        append_attribute_alters(ctx, AnyStatement::Trigger(self), AnyStatement::Trigger(new), script);
        ObjectState::after(start, script, false)
    }
}
