//! Constraint alters: deferrability, validation and enforcement state.
//! Any change to the constraint definition itself is a recreate.

use tracing::warn;

use crate::catalog::AnyStatement;
use crate::catalog::constraint::{Constraint, ConstraintBody};
use crate::dialect::Dialect;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::constraint::ms_check_state_sql;
use crate::render::{SqlContext, SqlScript};

fn deferrability_changed(old: &ConstraintBody, new: &ConstraintBody) -> bool {
    old.deferrable != new.deferrable || old.initially_deferred != new.initially_deferred
}

fn unalterable(old: &ConstraintBody, new: &ConstraintBody, dialect: Dialect) -> bool {
    if old.constraint_type != new.constraint_type || old.not_for_replication != new.not_for_replication {
        return true;
    }
    // Only foreign keys accept ALTER CONSTRAINT.
    dialect == Dialect::Pg && new.foreign_key_ref().is_none() && deferrability_changed(old, new)
}

fn pg_deferrable_clause(body: &ConstraintBody) -> &'static str {
    match (body.deferrable, body.initially_deferred) {
        (false, _) => "NOT DEFERRABLE",
        (true, false) => "DEFERRABLE INITIALLY IMMEDIATE",
        (true, true) => "DEFERRABLE INITIALLY DEFERRED",
    }
}

impl Diffable for Constraint {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        if unalterable(self, new, ctx.dialect) {
            return ObjectState::Recreate;
        }
        let start = script.len();
        let name = ctx.quote(new.name());

        match ctx.dialect {
            Dialect::Pg => {
                if deferrability_changed(self, new) {
                    script.push(format!(
                        "{} ALTER CONSTRAINT {name} {}",
                        ctx.alter_parent(false),
                        pg_deferrable_clause(new)
                    ));
                }
                match (self.not_valid, new.not_valid) {
                    (true, false) => script.push(format!(
                        "{} VALIDATE CONSTRAINT {name}",
                        ctx.alter_parent(false)
                    )),
                    (false, true) => warn!(
                        "{} cannot be marked NOT VALID once validated; leaving it validated",
                        ctx.id
                    ),
                    _ => {}
                }
            }
            Dialect::Ms => {
                if self.disabled != new.disabled || self.not_valid != new.not_valid {
                    script.push(ms_check_state_sql(ctx, new.name(), new.disabled, !new.not_valid));
                }
            }
        }

        append_attribute_alters(
            ctx,
            AnyStatement::Constraint(self),
            AnyStatement::Constraint(new),
            script,
        );
        ObjectState::after(start, script, false)
    }
}
