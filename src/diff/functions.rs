//! Routine alters: the definition is replaced in place unless the call
//! signature or result shape changed.

use crate::catalog::AnyStatement;
use crate::catalog::function::{Function, FunctionKind};
use crate::dialect::Dialect;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::function::append_definition;
use crate::render::{SqlContext, SqlScript};

fn pg_unalterable(old: &Function, new: &Function) -> bool {
    if old.kind != new.kind || old.return_type != new.return_type {
        return true;
    }
    if old.parameters.len() != new.parameters.len() {
        return true;
    }
    let params_changed = old.parameters.iter().zip(&new.parameters).any(|(o, n)| {
        o.mode != n.mode
            || o.name != n.name
            || o.data_type != n.data_type
            // A default can be added but never removed.
            || (o.default.is_some() && n.default.is_none())
    });
    if params_changed {
        return true;
    }
    new.kind == FunctionKind::Aggregate && old.body() != new.body()
}

fn ms_unalterable(old: &Function, new: &Function) -> bool {
    old.kind != new.kind
        || old.is_table_valued() != new.is_table_valued()
        || old.is_clr() != new.is_clr()
}

impl Diffable for Function {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let (unalterable, verb) = match ctx.dialect {
            Dialect::Pg => (pg_unalterable(self, new), "CREATE"),
            Dialect::Ms => (ms_unalterable(self, new), "ALTER"),
        };
        if unalterable || self.dialect() != new.dialect() {
            return ObjectState::Recreate;
        }
        let start = script.len();

        if self.body() != new.body() {
            append_definition(ctx, new, verb, script);
        }
        append_attribute_alters(ctx, AnyStatement::Function(self), AnyStatement::Function(new), script);
        ObjectState::after(start, script, false)
    }
}
