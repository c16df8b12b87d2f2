use crate::catalog::AnyStatement;
use crate::catalog::index::Index;
use crate::dialect::Dialect;
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState, option_changes};
use crate::render::index::cluster_sql;
use crate::render::{SqlContext, SqlScript, format_options};

impl Diffable for Index {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        if !self.same_structure(new, ctx.dialect == Dialect::Ms) {
            return ObjectState::Recreate;
        }
        let start = script.len();

        if ctx.dialect == Dialect::Pg {
            let alter = format!("ALTER INDEX {}", ctx.qualified(new.name()));
            if self.tablespace != new.tablespace {
                let tablespace = new.tablespace.as_deref().unwrap_or("pg_default");
                script.push(format!("{alter} SET TABLESPACE {}", ctx.quote(tablespace)));
            }
            let (set, reset) = option_changes(&self.options, &new.options);
            if !reset.is_empty() {
                script.push(format!("{alter} RESET ({})", reset.join(", ")));
            }
            if !set.is_empty() {
                script.push(format!("{alter} SET ({})", format_options(&set)));
            }
            if self.clustered != new.clustered {
                script.push(cluster_sql(ctx, new.clustered.then_some(new.name())));
            }
        }

        append_attribute_alters(ctx, AnyStatement::Index(self), AnyStatement::Index(new), script);
        ObjectState::after(start, script, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::{DbObjectId, StatementType};
    use crate::catalog::index::IndexBody;
    use crate::config::Settings;

    fn alter(old: &IndexBody, new: &IndexBody, dialect: Dialect) -> (ObjectState, Vec<String>) {
        let settings = Settings::default();
        let id = DbObjectId::table_child(StatementType::Index, "app", "users", "users_email_idx");
        let ctx = SqlContext::new(&id, dialect, &settings);
        let old = Index::builder("users_email_idx", old.clone()).build();
        let new = Index::builder("users_email_idx", new.clone()).build();
        let mut script = SqlScript::new();
        let state = old.append_alter_sql(&new, &ctx, &mut script);
        (state, script.ordered().map(str::to_string).collect())
    }

    #[test]
    fn test_pg_storage_changes_alter_in_place() {
        let old = IndexBody::on(["email"]);
        let mut new = old.clone();
        new.tablespace = Some("fast".into());
        new.options.insert("fillfactor".into(), "90".into());
        new.clustered = true;

        let (state, sql) = alter(&old, &new, Dialect::Pg);
        assert_eq!(state, ObjectState::Alter);
        assert_eq!(
            sql,
            vec![
                "ALTER INDEX app.users_email_idx SET TABLESPACE fast",
                "ALTER INDEX app.users_email_idx SET (fillfactor = 90)",
                "ALTER TABLE app.users CLUSTER ON users_email_idx",
            ]
        );
    }

    #[test]
    fn test_ms_storage_change_is_recreate() {
        let old = IndexBody::on(["email"]);
        let mut new = old.clone();
        new.tablespace = Some("INDEXES".into());
        assert_eq!(alter(&old, &new, Dialect::Ms).0, ObjectState::Recreate);
    }

    #[test]
    fn test_key_change_is_recreate() {
        let old = IndexBody::on(["email"]);
        let new = IndexBody::on(["email"]).unique();
        assert_eq!(alter(&old, &new, Dialect::Pg).0, ObjectState::Recreate);
    }
}
