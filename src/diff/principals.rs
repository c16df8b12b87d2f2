//! Database-level MS SQL objects: roles, users and CLR assemblies.

use crate::catalog::AnyStatement;
use crate::catalog::assembly::Assembly;
use crate::catalog::role::{Role, User};
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::assembly::visibility_sql;
use crate::render::principal::{add_member_sql, alter_user_options, drop_member_sql};
use crate::render::{SqlContext, SqlScript};

impl Diffable for Role {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let start = script.len();
        for member in self.members.difference(&new.members) {
            script.push(drop_member_sql(ctx, new.name(), member));
        }
        for member in new.members.difference(&self.members) {
            script.push(add_member_sql(ctx, new.name(), member));
        }
        append_attribute_alters(ctx, AnyStatement::Role(self), AnyStatement::Role(new), script);
        ObjectState::after(start, script, false)
    }
}

impl Diffable for User {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        // A user cannot be detached from its login or password.
        if (self.login.is_some() && new.login.is_none())
            || (self.password.is_some() && new.password.is_none())
        {
            return ObjectState::Recreate;
        }
        let start = script.len();

        let options = alter_user_options(ctx, self, new);
        if !options.is_empty() {
            script.push(format!(
                "ALTER USER {} WITH {}",
                ctx.quote(new.name()),
                options.join(", ")
            ));
        }
        append_attribute_alters(ctx, AnyStatement::User(self), AnyStatement::User(new), script);
        ObjectState::after(start, script, false)
    }
}

impl Diffable for Assembly {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        if self.binaries != new.binaries {
            return ObjectState::Recreate;
        }
        let start = script.len();

        if self.permission_set != new.permission_set {
            script.push(format!(
                "ALTER ASSEMBLY {} WITH PERMISSION_SET = {}",
                ctx.quote(new.name()),
                new.permission_set
            ));
        }
        if self.visible != new.visible {
            script.push(visibility_sql(ctx, new.name(), new.visible));
        }
        append_attribute_alters(ctx, AnyStatement::Assembly(self), AnyStatement::Assembly(new), script);
        ObjectState::after(start, script, false)
    }
}
