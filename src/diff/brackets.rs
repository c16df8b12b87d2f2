//! MS SQL table features that block structural changes while on.
//!
//! Change tracking needs a primary key, and system versioning forbids
//! adding or removing columns. When such a change happens on a table that
//! keeps the feature, the feature is switched off in the Begin slot and back
//! on in the End slot.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::id::{DbObjectId, StatementType};
use crate::catalog::{AnyStatement, Catalog};
use crate::config::Settings;
use crate::dialect::Dialect;
use crate::diff::context_for;
use crate::diff::operations::{Decision, MigrationStep, OperationKind};
use crate::render::table::{change_tracking_sql, system_versioning_sql};
use crate::render::{Slot, SqlScript};

fn child_decisions<'d>(
    decisions: &'d BTreeMap<DbObjectId, Decision>,
    catalog: &Catalog,
    table_id: &DbObjectId,
    kind: StatementType,
) -> impl Iterator<Item = (&'d DbObjectId, &'d Decision)> {
    let children: Vec<&'d DbObjectId> = decisions
        .keys()
        .filter(|id| id.kind == kind && catalog.parent(id) == Some(table_id))
        .collect();
    children.into_iter().filter_map(|id| decisions.get_key_value(id))
}

fn primary_key_replaced(
    decisions: &BTreeMap<DbObjectId, Decision>,
    old_catalog: &Catalog,
    table_id: &DbObjectId,
) -> bool {
    child_decisions(decisions, old_catalog, table_id, StatementType::Constraint).any(|(id, d)| {
        d.drops()
            && matches!(
                old_catalog.get(id).map(|e| e.statement),
                Some(AnyStatement::Constraint(c)) if c.is_primary_key()
            )
    })
}

fn columns_changed(
    decisions: &BTreeMap<DbObjectId, Decision>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
    table_id: &DbObjectId,
) -> bool {
    let changed = |d: &Decision| matches!(d, Decision::Create | Decision::Drop | Decision::Recreate);
    child_decisions(decisions, old_catalog, table_id, StatementType::Column).any(|(_, d)| changed(d))
        || child_decisions(decisions, new_catalog, table_id, StatementType::Column)
            .any(|(_, d)| changed(d))
}

/// Steps switching change tracking and system versioning off and on around
/// the changes they would block.
pub fn guard_steps(
    decisions: &BTreeMap<DbObjectId, Decision>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
    settings: &Settings,
) -> Vec<MigrationStep> {
    if new_catalog.dialect() != Dialect::Ms {
        return Vec::new();
    }

    let mut steps = Vec::new();
    for (table_id, entry) in &new_catalog.objects {
        let Some(new_table) = entry.statement.as_table() else {
            continue;
        };
        let Some(old_table) = old_catalog.get(table_id).and_then(|e| e.statement.as_table()) else {
            continue;
        };
        if !matches!(decisions.get(table_id), None | Some(Decision::Alter { .. })) {
            continue;
        }
        let (Some(old_ms), Some(new_ms)) = (old_table.ms_attrs(), new_table.ms_attrs()) else {
            continue;
        };

        let ctx = context_for(new_catalog, table_id, settings);
        let mut script = SqlScript::new();

        if let Some(track) = new_ms.tracked
            && old_ms.tracked == new_ms.tracked
            && primary_key_replaced(decisions, old_catalog, table_id)
        {
            debug!("{table_id}: suspending change tracking around primary key change");
            script.push_to(Slot::Begin, change_tracking_sql(&ctx, None));
            script.push_to(Slot::End, change_tracking_sql(&ctx, Some(track)));
        }

        if let Some(history) = &new_ms.history_table
            && old_ms.history_table == new_ms.history_table
            && columns_changed(decisions, old_catalog, new_catalog, table_id)
        {
            debug!("{table_id}: suspending system versioning around column changes");
            script.push_to(Slot::Begin, system_versioning_sql(&ctx, None));
            script.push_to(Slot::End, system_versioning_sql(&ctx, Some(history)));
        }

        if !script.is_empty() {
            steps.push(MigrationStep::new(table_id.clone(), OperationKind::Alter, script));
        }
    }
    steps
}
