//! Promotion of dependents of recreated objects.
//!
//! Dropping an object takes everything built on it along. Any object that
//! transitively depends on a recreated object, or on one altered with
//! dependents, is therefore recreated as well (or dropped, when it is gone
//! from the new tree).

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::catalog::{AnyStatement, Catalog};
use crate::catalog::id::DbObjectId;
use crate::diff::ObjectState;
use crate::diff::operations::Decision;

fn collect_dependents<'c>(
    catalog: &'c Catalog,
    id: &DbObjectId,
    seen: &mut BTreeSet<&'c DbObjectId>,
) {
    for dependent in catalog.dependents(id) {
        if seen.insert(dependent) {
            collect_dependents(catalog, dependent, seen);
        }
    }
}

/// Sequences whose old owner table or column is going away. PG drops them
/// along with it, so they are rebuilt even when unchanged.
fn orphaned_sequences(
    decisions: &BTreeMap<DbObjectId, Decision>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
) -> Vec<DbObjectId> {
    let drops = |id: &DbObjectId| decisions.get(id).is_some_and(Decision::drops);
    old_catalog
        .objects
        .iter()
        .filter_map(|(id, entry)| match entry.statement {
            AnyStatement::Sequence(sequence) => sequence.owned_by.as_ref().map(|owner| (id, owner)),
            _ => None,
        })
        .filter(|(id, owner)| {
            new_catalog.contains_id(id)
                && !drops(*id)
                && !matches!(decisions.get(*id), Some(Decision::Create))
                && (drops(&owner.table.table_id()) || drops(&owner.column_id()))
        })
        .map(|(id, _)| id.clone())
        .collect()
}

pub fn expand(
    mut decisions: BTreeMap<DbObjectId, Decision>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
) -> BTreeMap<DbObjectId, Decision> {
    let mut roots: Vec<DbObjectId> = decisions
        .iter()
        .filter(|(_, d)| matches!(d.state(), ObjectState::Recreate | ObjectState::AlterWithDep))
        .map(|(id, _)| id.clone())
        .collect();

    while !roots.is_empty() {
        let mut affected: BTreeSet<&DbObjectId> = BTreeSet::new();
        for root in &roots {
            collect_dependents(old_catalog, root, &mut affected);
        }

        for id in affected {
            if matches!(
                decisions.get(id),
                Some(Decision::Create | Decision::Drop | Decision::Recreate)
            ) {
                continue;
            }
            let promoted = if new_catalog.contains_id(id) {
                Decision::Recreate
            } else {
                Decision::Drop
            };
            debug!("{id}: {promoted} (dependency changed)");
            decisions.insert(id.clone(), promoted);
        }

        roots = orphaned_sequences(&decisions, old_catalog, new_catalog);
        for id in &roots {
            debug!("{id}: {} (owner dropped)", Decision::Recreate);
            decisions.insert(id.clone(), Decision::Recreate);
        }
    }
    decisions
}
