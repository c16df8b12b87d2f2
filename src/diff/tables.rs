//! Table alters. Columns and children are diffed as objects of their own;
//! only table-level properties are handled here.

use std::collections::BTreeMap;

use crate::catalog::AnyStatement;
use crate::catalog::table::{MsTable, PgTable, Table};
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState, foreign_option_actions, option_changes, reordered};
use crate::render::table::{
    change_tracking_sql, qualified_name, rls_sql, system_versioning_sql, table_name,
};
use crate::render::{Slot, SqlContext, SqlScript, format_options};

const DATA_COMPRESSION: &str = "DATA_COMPRESSION";

fn column_order_changed(old: &Table, new: &Table, ctx: &SqlContext<'_>, local_only: bool) -> bool {
    if ctx.settings.ignore_column_order {
        return false;
    }
    let names = |t: &Table| -> Vec<String> {
        if local_only {
            t.local_columns().map(|c| c.name().to_string()).collect()
        } else {
            t.columns().iter().map(|c| c.name().to_string()).collect()
        }
    };
    reordered(&names(old), &names(new))
}

fn append_pg_alters(old: &Table, new: &Table, old_pg: &PgTable, new_pg: &PgTable, ctx: &SqlContext<'_>, script: &mut SqlScript) {
    let name = table_name(ctx);
    let alter = format!("ALTER TABLE {name}");

    for parent in &old_pg.inherits {
        if !new_pg.inherits.contains(parent) {
            script.push(format!("{alter} NO INHERIT {}", qualified_name(ctx.dialect, parent)));
        }
    }
    for parent in &new_pg.inherits {
        if !old_pg.inherits.contains(parent) {
            script.push(format!("{alter} INHERIT {}", qualified_name(ctx.dialect, parent)));
        }
    }

    let (set, reset) = option_changes(&old.options, &new.options);
    if !reset.is_empty() {
        script.push(format!("{alter} RESET ({})", reset.join(", ")));
    }
    if !set.is_empty() {
        script.push(format!("{alter} SET ({})", format_options(&set)));
    }

    let actions = foreign_option_actions(ctx.dialect, &old_pg.foreign_options, &new_pg.foreign_options);
    if !actions.is_empty() {
        script.push(format!("ALTER FOREIGN TABLE {name} OPTIONS ({})", actions.join(", ")));
    }

    if old_pg.logged != new_pg.logged {
        let logged = if new_pg.logged { "LOGGED" } else { "UNLOGGED" };
        script.push(format!("{alter} SET {logged}"));
    }
    if old.tablespace != new.tablespace {
        let tablespace = new.tablespace.as_deref().unwrap_or("pg_default");
        script.push(format!("{alter} SET TABLESPACE {}", ctx.quote(tablespace)));
    }
    if old_pg.access_method != new_pg.access_method {
        let method = new_pg.access_method.as_deref().unwrap_or("heap");
        script.push(format!("{alter} SET ACCESS METHOD {method}"));
    }
    if old_pg.distribution != new_pg.distribution {
        let distribution = new_pg.distribution.as_deref().unwrap_or("DISTRIBUTED RANDOMLY");
        script.push(format!("{alter} SET {distribution}"));
    }

    if old_pg.rls_enabled != new_pg.rls_enabled {
        script.push(rls_sql(ctx, if new_pg.rls_enabled { "ENABLE" } else { "DISABLE" }));
    }
    if old_pg.rls_forced != new_pg.rls_forced {
        script.push(rls_sql(ctx, if new_pg.rls_forced { "FORCE" } else { "NO FORCE" }));
    }
}

fn without_compression(options: &BTreeMap<String, String>) -> BTreeMap<&String, &String> {
    options
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case(DATA_COMPRESSION))
        .collect()
}

fn compression(options: &BTreeMap<String, String>) -> Option<&String> {
    options
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(DATA_COMPRESSION))
        .map(|(_, v)| v)
}

fn ms_unalterable(old: &Table, new: &Table, old_ms: &MsTable, new_ms: &MsTable) -> bool {
    old_ms.ansi_nulls != new_ms.ansi_nulls
        || old.tablespace != new.tablespace
        || old_ms.text_image != new_ms.text_image
        || old_ms.filestream != new_ms.filestream
        || old_ms.period != new_ms.period
        || without_compression(&old.options) != without_compression(&new.options)
}

fn append_ms_alters(old: &Table, new: &Table, old_ms: &MsTable, new_ms: &MsTable, ctx: &SqlContext<'_>, script: &mut SqlScript) {
    let new_compression = compression(&new.options);
    if compression(&old.options) != new_compression {
        let value = new_compression.map_or("NONE", String::as_str);
        script.push(format!(
            "ALTER TABLE {} REBUILD WITH ({DATA_COMPRESSION} = {value})",
            table_name(ctx)
        ));
    }

    if old_ms.tracked != new_ms.tracked {
        if old_ms.tracked.is_some() {
            script.push_to(Slot::Begin, change_tracking_sql(ctx, None));
        }
        if new_ms.tracked.is_some() {
            script.push_to(Slot::End, change_tracking_sql(ctx, new_ms.tracked));
        }
    }

    if old_ms.history_table != new_ms.history_table {
        if old_ms.history_table.is_some() {
            script.push_to(Slot::Begin, system_versioning_sql(ctx, None));
        }
        if let Some(history) = &new_ms.history_table {
            script.push_to(Slot::End, system_versioning_sql(ctx, Some(history)));
        }
    }
}

impl Diffable for Table {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let start = script.len();
        match (self.pg_attrs(), new.pg_attrs(), self.ms_attrs(), new.ms_attrs()) {
            (Some(old_pg), Some(new_pg), _, _) => {
                if old_pg.kind != new_pg.kind || column_order_changed(self, new, ctx, true) {
                    return ObjectState::Recreate;
                }
                append_pg_alters(self, new, old_pg, new_pg, ctx, script);
            }
            (_, _, Some(old_ms), Some(new_ms)) => {
                if ms_unalterable(self, new, old_ms, new_ms) || column_order_changed(self, new, ctx, false) {
                    return ObjectState::Recreate;
                }
                append_ms_alters(self, new, old_ms, new_ms, ctx, script);
            }
            _ => return ObjectState::Recreate,
        }
        append_attribute_alters(ctx, AnyStatement::Table(self), AnyStatement::Table(new), script);
        ObjectState::after(start, script, false)
    }
}
