//! Column alters.

use crate::catalog::AnyStatement;
use crate::catalog::column::{Column, Identity, IdentityOptions, MsColumn, PgColumn};
use crate::diff::attributes::append_attribute_alters;
use crate::diff::{Diffable, ObjectState, foreign_option_actions, option_changes};
use crate::render::column::{alter_column_sql, ms_drop_default_sql, pg_identity_sql};
use crate::render::{SqlContext, SqlScript, format_options};

fn set_or_drop(flag: bool, what: &str) -> String {
    if flag {
        format!("ADD {what}")
    } else {
        format!("DROP {what}")
    }
}

/// `SET <option>` clauses moving an identity's sequence options.
fn identity_option_changes(old: &IdentityOptions, new: &IdentityOptions) -> Vec<String> {
    let mut clauses = Vec::new();
    if old.start != new.start
        && let Some(start) = new.start
    {
        clauses.push(format!("SET START WITH {start}"));
    }
    if old.increment != new.increment {
        clauses.push(format!("SET INCREMENT BY {}", new.increment.unwrap_or(1)));
    }
    if old.min_value != new.min_value {
        clauses.push(match new.min_value {
            Some(min) => format!("SET MINVALUE {min}"),
            None => "SET NO MINVALUE".to_string(),
        });
    }
    if old.max_value != new.max_value {
        clauses.push(match new.max_value {
            Some(max) => format!("SET MAXVALUE {max}"),
            None => "SET NO MAXVALUE".to_string(),
        });
    }
    if old.cache != new.cache {
        clauses.push(format!("SET CACHE {}", new.cache.unwrap_or(1)));
    }
    if old.cycle != new.cycle {
        clauses.push(if new.cycle { "SET CYCLE" } else { "SET NO CYCLE" }.to_string());
    }
    clauses
}

fn pg_unalterable(old: &Column, new: &Column, old_pg: &PgColumn, new_pg: &PgColumn) -> bool {
    if old_pg.inherited != new_pg.inherited {
        return true;
    }
    match (&old.generated, &new.generated) {
        (None, Some(_)) => true,
        (Some(o), Some(n)) => o != n,
        _ => false,
    }
}

fn append_pg_alters(
    old: &Column,
    new: &Column,
    old_pg: &PgColumn,
    new_pg: &PgColumn,
    ctx: &SqlContext<'_>,
    script: &mut SqlScript,
) -> bool {
    let name = new.name();
    let inherited = new_pg.inherited;
    let alter = |action: &str| alter_column_sql(ctx, inherited, name, action);
    let mut with_dep = false;

    if old.generated.is_some() && new.generated.is_none() {
        script.push(alter_column_sql(ctx, false, name, "DROP EXPRESSION"));
        with_dep = true;
    }

    // The type of an inherited column follows its parent.
    let type_changed =
        !inherited && (old.data_type != new.data_type || old.collation != new.collation);
    let mut old_default = old.default.as_deref();
    if type_changed {
        if old_default.is_some() {
            script.push(alter("DROP DEFAULT"));
            old_default = None;
        }
        let mut action = format!("TYPE {}", new.data_type);
        if let Some(collation) = &new.collation {
            action.push_str(&format!(" COLLATE {collation}"));
        }
        if ctx.settings.print_using {
            action.push_str(&format!(" USING {}::{}", ctx.quote(name), new.data_type));
        }
        script.push(alter(&action));
        with_dep = true;
    }

    if old_default != new.default.as_deref() {
        script.push(match &new.default {
            Some(default) => alter(&format!("SET DEFAULT {default}")),
            None => alter("DROP DEFAULT"),
        });
    }

    if old.not_null != new.not_null {
        script.push(alter(if new.not_null {
            "SET NOT NULL"
        } else {
            "DROP NOT NULL"
        }));
    }

    match (&old.identity, &new.identity) {
        (None, Some(Identity::Pg { always, options })) => {
            script.push(alter(&format!("ADD {}", pg_identity_sql(*always, options))));
        }
        (Some(_), None) => script.push(alter("DROP IDENTITY")),
        (
            Some(Identity::Pg {
                always: old_always,
                options: old_options,
            }),
            Some(Identity::Pg { always, options }),
        ) => {
            let mut clauses = Vec::new();
            if old_always != always {
                clauses.push(
                    if *always {
                        "SET GENERATED ALWAYS"
                    } else {
                        "SET GENERATED BY DEFAULT"
                    }
                    .to_string(),
                );
            }
            clauses.extend(identity_option_changes(old_options, options));
            if !clauses.is_empty() {
                script.push(alter(&clauses.join(" ")));
            }
        }
        _ => {}
    }

    if old_pg.storage != new_pg.storage {
        let storage = new_pg.storage.as_deref().unwrap_or("DEFAULT");
        script.push(alter(&format!("SET STORAGE {storage}")));
    }
    if old_pg.statistics != new_pg.statistics {
        let target = new_pg.statistics.unwrap_or(-1);
        script.push(alter(&format!("SET STATISTICS {target}")));
    }
    if old_pg.compression != new_pg.compression {
        let method = new_pg.compression.as_deref().unwrap_or("default");
        script.push(alter(&format!("SET COMPRESSION {method}")));
    }

    let (set, reset) = option_changes(&old_pg.options, &new_pg.options);
    if !reset.is_empty() {
        script.push(alter(&format!("RESET ({})", reset.join(", "))));
    }
    if !set.is_empty() {
        script.push(alter(&format!("SET ({})", format_options(&set))));
    }

    let actions = foreign_option_actions(ctx.dialect, &old_pg.foreign_options, &new_pg.foreign_options);
    if !actions.is_empty() {
        script.push(alter(&format!("OPTIONS ({})", actions.join(", "))));
    }

    with_dep
}

fn ms_unalterable(old: &Column, new: &Column, old_ms: &MsColumn, new_ms: &MsColumn) -> bool {
    old.identity != new.identity
        || old.generated != new.generated
        || old_ms.period != new_ms.period
        || old_ms.filestream != new_ms.filestream
}

fn ms_add_default_sql(ctx: &SqlContext<'_>, column: &str, default: &str, default_name: Option<&str>) -> String {
    let constraint = default_name
        .map(|n| format!(" CONSTRAINT {}", ctx.quote(n)))
        .unwrap_or_default();
    format!(
        "{} ADD{constraint} DEFAULT {default} FOR {}",
        ctx.alter_parent(false),
        ctx.quote(column)
    )
}

fn append_ms_alters(
    old: &Column,
    new: &Column,
    old_ms: &MsColumn,
    new_ms: &MsColumn,
    ctx: &SqlContext<'_>,
    script: &mut SqlScript,
) -> bool {
    let name = new.name();
    let alter = |action: &str| alter_column_sql(ctx, false, name, action);

    let type_changed = old.data_type != new.data_type || old.collation != new.collation;
    let column_changed = type_changed || old.not_null != new.not_null;
    let default_changed = old.default != new.default || old_ms.default_name != new_ms.default_name;

    // A bound default blocks any change to the column definition.
    if old.default.is_some() && (default_changed || column_changed) {
        script.push(ms_drop_default_sql(ctx, name, old_ms.default_name.as_deref()));
    }
    if column_changed {
        let mut definition = new.data_type.clone();
        if let Some(collation) = &new.collation {
            definition.push_str(&format!(" COLLATE {collation}"));
        }
        definition.push_str(if new.not_null { " NOT NULL" } else { " NULL" });
        script.push(alter(&definition));
    }
    if let Some(default) = &new.default
        && (default_changed || (column_changed && old.default.is_some()))
    {
        script.push(ms_add_default_sql(ctx, name, default, new_ms.default_name.as_deref()));
    }

    if old_ms.sparse != new_ms.sparse {
        script.push(alter(&set_or_drop(new_ms.sparse, "SPARSE")));
    }
    if old_ms.rowguidcol != new_ms.rowguidcol {
        script.push(alter(&set_or_drop(new_ms.rowguidcol, "ROWGUIDCOL")));
    }
    if old_ms.not_for_replication != new_ms.not_for_replication {
        script.push(alter(&set_or_drop(new_ms.not_for_replication, "NOT FOR REPLICATION")));
    }
    if old_ms.masking != new_ms.masking {
        script.push(alter(&match &new_ms.masking {
            Some(function) => format!("ADD MASKED WITH (FUNCTION = {})", ctx.literal(function)),
            None => "DROP MASKED".to_string(),
        }));
    }
    if old_ms.hidden != new_ms.hidden {
        script.push(alter(&set_or_drop(new_ms.hidden, "HIDDEN")));
    }

    type_changed
}

impl Diffable for Column {
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState {
        let start = script.len();
        let with_dep = match (self.pg_attrs(), new.pg_attrs(), self.ms_attrs(), new.ms_attrs()) {
            (Some(old_pg), Some(new_pg), _, _) => {
                if pg_unalterable(self, new, old_pg, new_pg) {
                    return ObjectState::Recreate;
                }
                append_pg_alters(self, new, old_pg, new_pg, ctx, script)
            }
            (_, _, Some(old_ms), Some(new_ms)) => {
                if ms_unalterable(self, new, old_ms, new_ms) {
                    return ObjectState::Recreate;
                }
                append_ms_alters(self, new, old_ms, new_ms, ctx, script)
            }
            _ => return ObjectState::Recreate,
        };
        append_attribute_alters(ctx, AnyStatement::Column(self), AnyStatement::Column(new), script);
        ObjectState::after(start, script, with_dep)
    }
}
