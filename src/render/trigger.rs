//! SQL rendering for triggers

use itertools::Itertools;

use crate::catalog::AnyStatement;
use crate::catalog::triggers::{MsTrigger, PgTrigger, Trigger, TriggerEvent, TriggerState};
use crate::dialect::Dialect;
use crate::render::{
    Renderable, SqlContext, SqlScript, append_create_attributes, append_ms_module_settings,
};

fn pg_events(ctx: &SqlContext<'_>, trigger: &Trigger, pg: &PgTrigger) -> String {
    trigger
        .events
        .iter()
        .map(|event| match event {
            TriggerEvent::Update if !pg.update_columns.is_empty() => {
                format!("UPDATE OF {}", ctx.dialect.quote_list(&pg.update_columns))
            }
            other => other.to_string(),
        })
        .join(" OR ")
}

fn pg_definition(ctx: &SqlContext<'_>, trigger: &Trigger, pg: &PgTrigger) -> String {
    let mut sql = String::from("CREATE ");
    if pg.constraint {
        sql.push_str("CONSTRAINT ");
    }
    sql.push_str(&format!(
        "TRIGGER {} {} {} ON {}",
        ctx.quote(trigger.name()),
        trigger.timing,
        pg_events(ctx, trigger, pg),
        ctx.parent_name()
    ));

    if pg.constraint {
        let deferrable = match (pg.deferrable, pg.initially_deferred) {
            (false, _) => String::new(),
            (true, false) => " DEFERRABLE".to_string(),
            (true, true) => " DEFERRABLE INITIALLY DEFERRED".to_string(),
        };
        sql.push_str(&deferrable);
    }

    // Transition tables
    let mut referencing = Vec::new();
    if let Some(old_table) = &pg.old_table {
        referencing.push(format!("OLD TABLE AS {}", ctx.quote(old_table)));
    }
    if let Some(new_table) = &pg.new_table {
        referencing.push(format!("NEW TABLE AS {}", ctx.quote(new_table)));
    }
    if !referencing.is_empty() {
        sql.push_str(&format!(" REFERENCING {}", referencing.join(" ")));
    }

    sql.push_str(if pg.for_each_row {
        " FOR EACH ROW"
    } else {
        " FOR EACH STATEMENT"
    });
    if let Some(when) = &pg.when {
        sql.push_str(&format!(" WHEN ({when})"));
    }
    sql.push_str(&format!(" EXECUTE FUNCTION {}", pg.function));
    sql
}

/// Full MS trigger text; `verb` is `CREATE` or `ALTER`.
pub fn ms_definition(ctx: &SqlContext<'_>, trigger: &Trigger, ms: &MsTrigger, verb: &str) -> String {
    let mut sql = format!(
        "{verb} TRIGGER {} ON {}",
        ctx.qualified(trigger.name()),
        ctx.parent_name()
    );
    if !ms.options.is_empty() {
        sql.push_str(&format!("\nWITH {}", ms.options.join(", ")));
    }
    let events: Vec<String> = trigger.events.iter().map(ToString::to_string).collect();
    sql.push_str(&format!("\n{} {}", trigger.timing, events.join(", ")));
    if ms.not_for_replication {
        sql.push_str("\nNOT FOR REPLICATION");
    }
    sql.push_str("\nAS\n");
    sql.push_str(&ms.body);
    sql
}

/// Statement switching the trigger to `state`.
pub fn state_sql(ctx: &SqlContext<'_>, name: &str, state: TriggerState) -> String {
    match ctx.dialect {
        Dialect::Pg => {
            let action = match state {
                TriggerState::Enabled => "ENABLE",
                TriggerState::Disabled => "DISABLE",
                TriggerState::Replica => "ENABLE REPLICA",
                TriggerState::Always => "ENABLE ALWAYS",
            };
            format!(
                "ALTER TABLE {} {action} TRIGGER {}",
                ctx.parent_name(),
                ctx.quote(name)
            )
        }
        Dialect::Ms => {
            let action = match state {
                TriggerState::Disabled => "DISABLE",
                _ => "ENABLE",
            };
            format!(
                "{action} TRIGGER {} ON {}",
                ctx.qualified(name),
                ctx.parent_name()
            )
        }
    }
}

pub fn append_ms_definition(ctx: &SqlContext<'_>, trigger: &Trigger, ms: &MsTrigger, verb: &str, script: &mut SqlScript) {
    append_ms_module_settings(script, Some(ms.quoted_identifier), ms.ansi_nulls);
    script.push(ms_definition(ctx, trigger, ms, verb));
}

impl Renderable for Trigger {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        if let Some(pg) = self.pg_attrs() {
            script.push(ctx.guarded(pg_definition(ctx, self, pg)));
        } else if let Some(ms) = self.ms_attrs() {
            append_ms_definition(ctx, self, ms, "CREATE", script);
        }
        if self.state != TriggerState::Enabled {
            script.push(state_sql(ctx, self.name(), self.state));
        }
        append_create_attributes(ctx, AnyStatement::Trigger(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let sql = match ctx.dialect {
            Dialect::Pg => format!(
                "DROP TRIGGER{} {} ON {}",
                ctx.if_exists(),
                ctx.quote(self.name()),
                ctx.parent_name()
            ),
            Dialect::Ms => format!("DROP TRIGGER{} {}", ctx.if_exists(), ctx.qualified(self.name())),
        };
        script.push(sql);
    }
}
