use crate::catalog::AnyStatement;
use crate::catalog::policy::Policy;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::policy::alter_policy_sql;
use crate::render::{SqlContext, SqlScript};

fn changed<'a, T: PartialEq + ?Sized>(old: &T, new: &'a T) -> Option<&'a T> {
    (old != new).then_some(new)
}

impl Diffable for Policy {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        // ALTER POLICY can replace an expression but not remove it.
        let removed = |old: &Option<String>, new: &Option<String>| old.is_some() && new.is_none();
        if self.command != new.command
            || self.permissive != new.permissive
            || removed(&self.using, &new.using)
            || removed(&self.with_check, &new.with_check)
        {
            return ObjectState::Recreate;
        }
        let start = script.len();

        let roles = changed(self.roles.as_slice(), new.roles.as_slice());
        let using = changed(&self.using, &new.using).and_then(Option::as_deref);
        let with_check = changed(&self.with_check, &new.with_check).and_then(Option::as_deref);
        if roles.is_some() || using.is_some() || with_check.is_some() {
            script.push(alter_policy_sql(ctx, new.name(), roles, using, with_check));
        }

        append_attribute_alters(ctx, AnyStatement::Policy(self), AnyStatement::Policy(new), script);
        ObjectState::after(start, script, false)
    }
}
