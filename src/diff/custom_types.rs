//! User-defined type alters. Only composite attributes and enum labels can
//! change in place; every other kind of type is recreated.

use crate::catalog::AnyStatement;
use crate::catalog::custom_type::{CompositeAttribute, CustomType, TypeKind};
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState, reordered};
use crate::render::types::{add_enum_value_sql, alter_attributes_sql, attribute_definition};
use crate::render::{SqlContext, SqlScript};

fn attribute_actions(ctx: &SqlContext<'_>, old: &[CompositeAttribute], new: &[CompositeAttribute]) -> Vec<String> {
    let mut actions = Vec::new();
    for attribute in old {
        if !new.iter().any(|n| n.name == attribute.name) {
            actions.push(format!("DROP ATTRIBUTE {}", ctx.quote(&attribute.name)));
        }
    }
    for attribute in new {
        match old.iter().find(|o| o.name == attribute.name) {
            None => actions.push(format!("ADD ATTRIBUTE {}", attribute_definition(ctx, attribute))),
            Some(existing) if existing != attribute => {
                let mut action = format!(
                    "ALTER ATTRIBUTE {} TYPE {}",
                    ctx.quote(&attribute.name),
                    attribute.data_type
                );
                if let Some(collation) = &attribute.collation {
                    action.push_str(&format!(" COLLATE {collation}"));
                }
                actions.push(action);
            }
            Some(_) => {}
        }
    }
    actions
}

/// True when every old label is still present in the same relative order.
fn labels_extend(old: &[String], new: &[String]) -> bool {
    let mut remaining = old.iter().peekable();
    for value in new {
        if remaining.peek() == Some(&value) {
            remaining.next();
        } else if old.contains(value) {
            return false;
        }
    }
    remaining.next().is_none()
}

fn append_enum_values(ctx: &SqlContext<'_>, old: &[String], new: &[String], script: &mut SqlScript) {
    for (i, value) in new.iter().enumerate() {
        if old.contains(value) {
            continue;
        }
        let position = match i.checked_sub(1) {
            Some(prev) => Some(("AFTER", new[prev].as_str())),
            None => old.first().map(|first| ("BEFORE", first.as_str())),
        };
        script.push(add_enum_value_sql(ctx, value, position));
    }
}

impl Diffable for CustomType {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let start = script.len();
        let mut with_dep = false;

        match (&self.kind, &new.kind) {
            (TypeKind::Composite { attributes: old }, TypeKind::Composite { attributes: new }) => {
                let names = |attrs: &[CompositeAttribute]| -> Vec<String> {
                    attrs.iter().map(|a| a.name.clone()).collect()
                };
                if reordered(&names(old), &names(new)) {
                    return ObjectState::Recreate;
                }
                let actions = attribute_actions(ctx, old, new);
                if !actions.is_empty() {
                    script.push(alter_attributes_sql(ctx, &actions));
                    // Columns and routines of this type see the new shape.
                    with_dep = true;
                }
            }
            (TypeKind::Enum { values: old }, TypeKind::Enum { values: new }) => {
                if !labels_extend(old, new) {
                    return ObjectState::Recreate;
                }
                append_enum_values(ctx, old, new, script);
            }
            (old, new) if old != new => return ObjectState::Recreate,
            _ => {}
        }

        append_attribute_alters(
            ctx,
            AnyStatement::Type(self),
            AnyStatement::Type(new),
            script,
        );
        ObjectState::after(start, script, with_dep)
    }
}
