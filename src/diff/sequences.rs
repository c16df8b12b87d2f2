use crate::catalog::AnyStatement;
use crate::catalog::sequence::Sequence;
use crate::dialect::Dialect;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::sequence::{alter_clauses, owned_by_sql};
use crate::render::{Slot, SqlContext, SqlScript};

impl Diffable for Sequence {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        // MS sequences cannot change their type.
        if ctx.dialect == Dialect::Ms && self.data_type != new.data_type {
            return ObjectState::Recreate;
        }
        let start = script.len();

        let clauses = alter_clauses(ctx.dialect, self, new);
        if !clauses.is_empty() {
            script.push(format!(
                "ALTER SEQUENCE {} {}",
                ctx.qualified(new.name()),
                clauses.join(" ")
            ));
        }
        // The owning column may be created later in the script.
        if self.owned_by != new.owned_by {
            script.push_to(Slot::End, owned_by_sql(ctx, new.name(), new.owned_by.as_ref()));
        }

        append_attribute_alters(ctx, AnyStatement::Sequence(self), AnyStatement::Sequence(new), script);
        ObjectState::after(start, script, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::{DbObjectId, QualifiedName, StatementType};
    use crate::catalog::sequence::{SequenceBody, SequenceOwner};
    use crate::config::Settings;

    fn make_test_sequence(f: impl FnOnce(&mut SequenceBody)) -> Sequence {
        Sequence::builder("order_seq", SequenceBody::new(1)).with_body(f).build()
    }

    #[test]
    fn test_pg_sequence_alter() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Sequence, "app", "order_seq");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let old = make_test_sequence(|_| {});
        let new = make_test_sequence(|b| {
            b.increment = Some(10);
            b.cycle = true;
            b.owned_by = Some(SequenceOwner {
                table: QualifiedName::new("app", "orders"),
                column: "id".into(),
            });
        });

        let mut script = SqlScript::new();
        let state = old.append_alter_sql(&new, &ctx, &mut script);
        assert_eq!(state, ObjectState::Alter);
        assert_eq!(
            script.in_slot(Slot::Mid).collect::<Vec<_>>(),
            vec!["ALTER SEQUENCE app.order_seq INCREMENT BY 10 CYCLE"]
        );
        assert_eq!(
            script.in_slot(Slot::End).collect::<Vec<_>>(),
            vec!["ALTER SEQUENCE app.order_seq OWNED BY app.orders.id"]
        );
    }

    #[test]
    fn test_ms_type_change_is_recreate() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Sequence, "dbo", "order_seq");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let old = make_test_sequence(|b| b.data_type = Some("[int]".into()));
        let new = make_test_sequence(|b| b.data_type = Some("[bigint]".into()));

        let mut script = SqlScript::new();
        assert_eq!(old.append_alter_sql(&new, &ctx, &mut script), ObjectState::Recreate);
        assert!(script.is_empty());
    }
}
