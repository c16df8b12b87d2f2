//! View alters.
//!
//! A PostgreSQL view whose query or shape changed is recreated along with
//! everything built on it. MS SQL views are altered in place, except for
//! indexed views whose indexes would be lost.

use std::collections::BTreeMap;

use crate::catalog::AnyStatement;
use crate::catalog::statement::Container;
use crate::catalog::view::{MsView, PgView, View};
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState, option_changes};
use crate::render::view::{column_comment_sql, column_default_sql, ms_definition};
use crate::render::{SqlContext, SqlScript, append_ms_module_settings, format_options};

fn pg_unalterable(old: &View, new: &View, old_pg: &PgView, new_pg: &PgView) -> bool {
    old_pg.materialized != new_pg.materialized
        || old_pg.query != new_pg.query
        || old_pg.with_data != new_pg.with_data
        || old.column_names != new.column_names
}

/// Keys whose value was set, changed or removed.
fn changed_entries<'m>(
    old: &'m BTreeMap<String, String>,
    new: &'m BTreeMap<String, String>,
) -> Vec<(&'m str, Option<&'m str>)> {
    let mut changes: Vec<(&str, Option<&str>)> = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.as_str(), Some(v.as_str())))
        .collect();
    changes.extend(
        old.keys()
            .filter(|k| !new.contains_key(*k))
            .map(|k| (k.as_str(), None)),
    );
    changes
}

fn append_pg_alters(old_pg: &PgView, new: &View, new_pg: &PgView, ctx: &SqlContext<'_>, script: &mut SqlScript) {
    let alter = format!("ALTER {} {}", new.keyword(), ctx.qualified(new.name()));

    let (set, reset) = option_changes(&old_pg.options, &new_pg.options);
    if !reset.is_empty() {
        script.push(format!("{alter} RESET ({})", reset.join(", ")));
    }
    if !set.is_empty() {
        script.push(format!("{alter} SET ({})", format_options(&set)));
    }
    if new_pg.materialized && old_pg.tablespace != new_pg.tablespace {
        let tablespace = new_pg.tablespace.as_deref().unwrap_or("pg_default");
        script.push(format!("{alter} SET TABLESPACE {}", ctx.quote(tablespace)));
    }

    for (column, default) in changed_entries(&old_pg.column_defaults, &new_pg.column_defaults) {
        script.push(column_default_sql(ctx, new, column, default));
    }
    for (column, comment) in changed_entries(&old_pg.column_comments, &new_pg.column_comments) {
        script.push_to(ctx.comment_slot(), column_comment_sql(ctx, new, column, comment));
    }
}

fn ms_definition_changed(old: &View, new: &View, old_ms: &MsView, new_ms: &MsView) -> bool {
    old_ms != new_ms || old.column_names != new.column_names
}

impl Diffable for View {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let start = script.len();
        match (self.pg_attrs(), new.pg_attrs(), self.ms_attrs(), new.ms_attrs()) {
            (Some(old_pg), Some(new_pg), _, _) => {
                if pg_unalterable(self, new, old_pg, new_pg) {
                    return ObjectState::Recreate;
                }
                append_pg_alters(old_pg, new, new_pg, ctx, script);
            }
            (_, _, Some(old_ms), Some(new_ms)) => {
                if ms_definition_changed(self, new, old_ms, new_ms) {
                    // ALTER VIEW drops the indexes of an indexed view.
                    if self.children().indexes().next().is_some() {
                        return ObjectState::Recreate;
                    }
                    append_ms_module_settings(script, Some(new_ms.quoted_identifier), new_ms.ansi_nulls);
                    script.push(ms_definition(ctx, new, new_ms, "ALTER"));
                }
            }
            _ => return ObjectState::Recreate,
        }
        append_attribute_alters(ctx, AnyStatement::View(self), AnyStatement::View(new), script);
        ObjectState::after(start, script, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::DbObjectId;
    use crate::catalog::index::{Index, IndexBody};
    use crate::catalog::view::ViewBody;
    use crate::config::Settings;
    use crate::dialect::Dialect;

    fn alter(old: &View, new: &View, dialect: Dialect) -> (ObjectState, Vec<String>) {
        let settings = Settings::default();
        let schema = if dialect == Dialect::Pg { "app" } else { "dbo" };
        let id = DbObjectId::view(schema, old.name());
        let ctx = SqlContext::new(&id, dialect, &settings);
        let mut script = SqlScript::new();
        let state = old.append_alter_sql(new, &ctx, &mut script);
        (state, script.ordered().map(str::to_string).collect())
    }

    #[test]
    fn test_pg_query_change_is_recreate() {
        let old = View::builder("v", ViewBody::pg("SELECT 1 AS a")).build();
        let new = View::builder("v", ViewBody::pg("SELECT 2 AS a")).build();
        assert_eq!(alter(&old, &new, Dialect::Pg).0, ObjectState::Recreate);
    }

    #[test]
    fn test_pg_view_options_and_column_defaults() {
        let old = View::builder("v", ViewBody::pg("SELECT 1 AS a"))
            .with_body(|b| {
                if let Some(pg) = b.pg_attrs_mut() {
                    pg.column_defaults.insert("a".into(), "0".into());
                }
            })
            .build();
        let new = View::builder("v", ViewBody::pg("SELECT 1 AS a"))
            .with_body(|b| {
                if let Some(pg) = b.pg_attrs_mut() {
                    pg.options.insert("security_barrier".into(), "true".into());
                    pg.column_comments.insert("a".into(), "answer".into());
                }
            })
            .build();

        let (state, sql) = alter(&old, &new, Dialect::Pg);
        assert_eq!(state, ObjectState::Alter);
        assert_eq!(
            sql,
            vec![
                "ALTER VIEW app.v SET (security_barrier = true)",
                "ALTER VIEW app.v ALTER COLUMN a DROP DEFAULT",
                "COMMENT ON COLUMN app.v.a IS 'answer'",
            ]
        );
    }

    #[test]
    fn test_ms_view_alter_and_indexed_view() {
        let old = View::builder("v", ViewBody::ms("SELECT 1 AS a")).build();
        let new = View::builder("v", ViewBody::ms("SELECT 2 AS a")).build();
        let (state, sql) = alter(&old, &new, Dialect::Ms);
        assert_eq!(state, ObjectState::Alter);
        assert_eq!(sql[2], "ALTER VIEW [dbo].[v]\nAS\nSELECT 2 AS a");

        let indexed = View::builder("v", ViewBody::ms("SELECT 1 AS a"))
            .index(Index::builder("ix_v", IndexBody::on(["a"])).build())
            .unwrap()
            .build();
        assert_eq!(alter(&indexed, &new, Dialect::Ms).0, ObjectState::Recreate);
    }
}
