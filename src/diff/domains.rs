use tracing::warn;

use crate::catalog::AnyStatement;
use crate::catalog::domain::Domain;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState};
use crate::render::domain::{
    add_constraint_sql, drop_constraint_sql, not_null_sql, set_default_sql, validate_constraint_sql,
};
use crate::render::{SqlContext, SqlScript};

impl Diffable for Domain {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        if self.base_type != new.base_type || self.collation != new.collation {
            return ObjectState::Recreate;
        }
        let start = script.len();

        if self.default != new.default {
            script.push(set_default_sql(ctx, new.default.as_deref()));
        }
        if self.not_null != new.not_null {
            script.push(not_null_sql(ctx, new.not_null));
        }

        for (name, old_check) in &self.constraints {
            match new.constraints.get(name) {
                Some(check) if check.expression == old_check.expression => {}
                _ => script.push(drop_constraint_sql(ctx, name)),
            }
        }
        for (name, check) in &new.constraints {
            match self.constraints.get(name) {
                Some(old_check) if old_check.expression == check.expression => {
                    match (old_check.not_valid, check.not_valid) {
                        (true, false) => script.push(validate_constraint_sql(ctx, name)),
                        (false, true) => warn!(
                            "constraint {name} on {} cannot be marked NOT VALID once validated",
                            ctx.id
                        ),
                        _ => {}
                    }
                }
                _ => script.push(add_constraint_sql(ctx, name, check)),
            }
        }

        append_attribute_alters(ctx, AnyStatement::Domain(self), AnyStatement::Domain(new), script);
        ObjectState::after(start, script, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::DomainBody;
    use crate::catalog::id::{DbObjectId, StatementType};
    use crate::config::Settings;
    use crate::dialect::Dialect;

    fn alter(old: DomainBody, new: DomainBody) -> (ObjectState, Vec<String>) {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Domain, "app", "positive");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let old = Domain::builder("positive", old).build();
        let new = Domain::builder("positive", new).build();
        let mut script = SqlScript::new();
        let state = old.append_alter_sql(&new, &ctx, &mut script);
        (state, script.ordered().map(str::to_string).collect())
    }

    #[test]
    fn test_domain_default_and_checks() {
        let old = DomainBody::new("integer").with_check("positive_check", "VALUE > 0");
        let mut new = DomainBody::new("integer").with_check("positive_check", "VALUE >= 1");
        new.default = Some("1".into());
        new.not_null = true;

        let (state, sql) = alter(old, new);
        assert_eq!(state, ObjectState::Alter);
        assert_eq!(
            sql,
            vec![
                "ALTER DOMAIN app.positive SET DEFAULT 1",
                "ALTER DOMAIN app.positive SET NOT NULL",
                "ALTER DOMAIN app.positive DROP CONSTRAINT positive_check",
                "ALTER DOMAIN app.positive ADD CONSTRAINT positive_check CHECK (VALUE >= 1)",
            ]
        );
    }

    #[test]
    fn test_domain_validation() {
        let mut old = DomainBody::new("integer").with_check("positive_check", "VALUE > 0");
        if let Some(check) = old.constraints.get_mut("positive_check") {
            check.not_valid = true;
        }
        let new = DomainBody::new("integer").with_check("positive_check", "VALUE > 0");
        let (_, sql) = alter(old.clone(), new.clone());
        assert_eq!(sql, vec!["ALTER DOMAIN app.positive VALIDATE CONSTRAINT positive_check"]);

        let (state, sql) = alter(new, old);
        assert_eq!(state, ObjectState::Nothing);
        assert!(sql.is_empty());
    }

    #[test]
    fn test_base_type_change_is_recreate() {
        let (state, _) = alter(DomainBody::new("integer"), DomainBody::new("bigint"));
        assert_eq!(state, ObjectState::Recreate);
    }
}
