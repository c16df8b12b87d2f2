//! Alter/diff engine.
//!
//! Both trees are flattened into [`Catalog`]s, every id in their union gets a
//! [`Decision`], the cascade promotes dependents of recreated objects, and
//! the resulting steps are ordered by dependency before being assembled into
//! one [`SqlScript`].

pub mod attributes;
pub mod brackets;
pub mod cascade;
pub mod columns;
pub mod constraints;
pub mod custom_types;
pub mod domains;
pub mod functions;
pub mod indexes;
pub mod operations;
pub mod policies;
pub mod principals;
pub mod schemas;
pub mod sequences;
pub mod statistics;
pub mod tables;
pub mod triggers;
pub mod views;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use tracing::{debug, info, warn};

use crate::catalog::id::{DbObjectId, StatementType};
use crate::catalog::{AnyStatement, Catalog, Database};
use crate::config::Settings;
use crate::dialect::Dialect;
use crate::diff::operations::{Decision, MigrationStep, OperationKind};
use crate::render::{SqlContext, SqlScript};

/// Outcome of comparing two versions of the same object.
///
/// Variants are ordered by severity so that several partial outcomes can be
/// merged with [`ObjectState::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectState {
    #[default]
    Nothing,
    /// Altered in place; dependents are unaffected.
    Alter,
    /// Altered in place, but dependents must be regenerated.
    AlterWithDep,
    /// Cannot be altered; the object is dropped and created again.
    Recreate,
}

impl ObjectState {
    pub fn merge(self, other: ObjectState) -> ObjectState {
        self.max(other)
    }

    /// State of an alter that appended statements to `script` from `start` on.
    pub fn after(start: usize, script: &SqlScript, with_dep: bool) -> ObjectState {
        if with_dep {
            ObjectState::AlterWithDep
        } else if script.len() > start {
            ObjectState::Alter
        } else {
            ObjectState::Nothing
        }
    }
}

impl fmt::Display for ObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectState::Nothing => "NOTHING",
            ObjectState::Alter => "ALTER",
            ObjectState::AlterWithDep => "ALTER_WITH_DEP",
            ObjectState::Recreate => "RECREATE",
        })
    }
}

/// In-place alteration of a statement into a newer version of itself.
pub trait Diffable {
    /// Append the statements turning `self` into `new`.
    ///
    /// Unalterable attributes are checked before anything is emitted: a
    /// [`ObjectState::Recreate`] result leaves `script` untouched.
    fn append_alter_sql(&self, new: &Self, ctx: &SqlContext<'_>, script: &mut SqlScript) -> ObjectState;
}

/// Dispatch [`Diffable::append_alter_sql`] over a pair of flattened
/// statements. Statements of different kinds can only be recreated.
pub fn alter_any(
    old: AnyStatement<'_>,
    new: AnyStatement<'_>,
    ctx: &SqlContext<'_>,
    script: &mut SqlScript,
) -> ObjectState {
    use AnyStatement as S;
    match (old, new) {
        (S::Schema(o), S::Schema(n)) => o.append_alter_sql(n, ctx, script),
        (S::Extension(o), S::Extension(n)) => o.append_alter_sql(n, ctx, script),
        (S::Role(o), S::Role(n)) => o.append_alter_sql(n, ctx, script),
        (S::User(o), S::User(n)) => o.append_alter_sql(n, ctx, script),
        (S::Assembly(o), S::Assembly(n)) => o.append_alter_sql(n, ctx, script),
        (S::Table(o), S::Table(n)) => o.append_alter_sql(n, ctx, script),
        (S::Column(o), S::Column(n)) => o.append_alter_sql(n, ctx, script),
        (S::Constraint(o), S::Constraint(n)) => o.append_alter_sql(n, ctx, script),
        (S::Index(o), S::Index(n)) => o.append_alter_sql(n, ctx, script),
        (S::Trigger(o), S::Trigger(n)) => o.append_alter_sql(n, ctx, script),
        (S::Policy(o), S::Policy(n)) => o.append_alter_sql(n, ctx, script),
        (S::Statistics(o), S::Statistics(n)) => o.append_alter_sql(n, ctx, script),
        (S::Sequence(o), S::Sequence(n)) => o.append_alter_sql(n, ctx, script),
        (S::Function(o), S::Function(n)) => o.append_alter_sql(n, ctx, script),
        (S::View(o), S::View(n)) => o.append_alter_sql(n, ctx, script),
        (S::Type(o), S::Type(n)) => o.append_alter_sql(n, ctx, script),
        (S::Domain(o), S::Domain(n)) => o.append_alter_sql(n, ctx, script),
        _ => ObjectState::Recreate,
    }
}

/// True when the entries kept from `old` changed their relative order, or
/// when an added entry sits before a kept one.
pub fn reordered<T: PartialEq>(old: &[T], new: &[T]) -> bool {
    let kept: Vec<&T> = old.iter().filter(|o| new.contains(o)).collect();
    let mut next = 0;
    for item in new {
        if old.contains(item) {
            if kept.get(next) != Some(&item) {
                return true;
            }
            next += 1;
        } else if next < kept.len() {
            return true;
        }
    }
    false
}

/// Storage option changes as the `SET (...)` pairs and the `RESET (...)` keys.
pub fn option_changes(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> (BTreeMap<String, String>, Vec<String>) {
    let set = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let reset = old.keys().filter(|k| !new.contains_key(*k)).cloned().collect();
    (set, reset)
}

/// `ADD`/`SET`/`DROP` entries of a PG `OPTIONS (...)` change on a foreign
/// object.
pub fn foreign_option_actions(
    dialect: Dialect,
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut actions = Vec::new();
    for (key, value) in new {
        match old.get(key) {
            None => actions.push(format!("ADD {key} {}", dialect.quote_literal(value))),
            Some(v) if v != value => {
                actions.push(format!("SET {key} {}", dialect.quote_literal(value)))
            }
            Some(_) => {}
        }
    }
    actions.extend(
        old.keys()
            .filter(|k| !new.contains_key(*k))
            .map(|k| format!("DROP {k}")),
    );
    actions
}

/// Context for `id` in `catalog`, with the owning table or view attached.
pub fn context_for<'a>(
    catalog: &Catalog<'a>,
    id: &'a DbObjectId,
    settings: &'a Settings,
) -> SqlContext<'a> {
    SqlContext::new(id, catalog.dialect(), settings).with_parent(catalog.parent_statement(id))
}

/// Decide every object in the union of both catalogs.
pub fn diff_all(old: &Catalog, new: &Catalog, settings: &Settings) -> BTreeMap<DbObjectId, Decision> {
    info!(
        "Diffing catalogs: {} objects before, {} after",
        old.objects.len(),
        new.objects.len()
    );
    let dialect = new.dialect();
    let ids: BTreeSet<&DbObjectId> = old.objects.keys().chain(new.objects.keys()).collect();

    let mut decisions = BTreeMap::new();
    for id in ids {
        if id.schema_name().is_some_and(|s| dialect.is_system_schema(s)) {
            continue;
        }
        let decision = match (old.get(id), new.get(id)) {
            (Some(_), None) => Decision::Drop,
            (None, Some(_)) => Decision::Create,
            (Some(o), Some(n)) if o.statement.same_as(&n.statement) => continue,
            (Some(o), Some(n)) => {
                let ctx = context_for(new, id, settings);
                let mut script = SqlScript::new();
                match alter_any(o.statement, n.statement, &ctx, &mut script) {
                    ObjectState::Nothing => continue,
                    ObjectState::Recreate => Decision::Recreate,
                    state => Decision::Alter { state, script },
                }
            }
            (None, None) => continue,
        };
        debug!("{id}: {decision}");
        decisions.insert(id.clone(), decision);
    }
    decisions
}

/// Migration steps turning `old` into `new`, in execution order.
pub fn diff_steps(
    old: &Database,
    new: &Database,
    settings: &Settings,
) -> anyhow::Result<Vec<MigrationStep>> {
    if old.dialect() != new.dialect() {
        anyhow::bail!(
            "Cannot diff a {} database against a {} database",
            old.dialect(),
            new.dialect()
        );
    }
    let old_catalog = Catalog::new(old);
    let new_catalog = Catalog::new(new);

    let decisions = diff_all(&old_catalog, &new_catalog, settings);
    let decisions = cascade::expand(decisions, &old_catalog, &new_catalog);
    let mut steps = operations::build_steps(&decisions, &old_catalog, &new_catalog, settings);
    steps.extend(brackets::guard_steps(
        &decisions,
        &old_catalog,
        &new_catalog,
        settings,
    ));
    diff_order(steps, &old_catalog, &new_catalog)
}

/// Diff two databases into one script: Begin statements, then Mid, then End,
/// each slot in step order.
pub fn diff_databases(old: &Database, new: &Database, settings: &Settings) -> anyhow::Result<SqlScript> {
    let steps = diff_steps(old, new, settings)?;
    let mut script = SqlScript::new();
    for step in &steps {
        script.append(step.script.clone());
    }
    info!(
        "Diff complete: {} steps, {} statements",
        steps.len(),
        script.len()
    );
    Ok(script)
}

/// Topo-sort the steps by their dependencies.
/// Foreign key creations form a second phase so that tables referencing
/// each other can all be created first.
pub fn diff_order(
    steps: Vec<MigrationStep>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
) -> anyhow::Result<Vec<MigrationStep>> {
    debug!("Ordering {} migration steps", steps.len());
    let (relationship_steps, primary_steps): (Vec<_>, Vec<_>) = steps
        .into_iter()
        .partition(|step| step.is_relationship(new_catalog));

    let mut ordered = order_steps_by_dependencies(primary_steps, old_catalog, new_catalog)?;
    ordered.extend(order_steps_by_dependencies(
        relationship_steps,
        old_catalog,
        new_catalog,
    )?);
    Ok(ordered)
}

/// Owner table and column of a sequence with `OWNED BY`.
fn sequence_owner(catalog: &Catalog, id: &DbObjectId) -> Option<[DbObjectId; 2]> {
    match catalog.get(id)?.statement {
        AnyStatement::Sequence(sequence) => sequence
            .owned_by
            .as_ref()
            .map(|owner| [owner.table.table_id(), owner.column_id()]),
        _ => None,
    }
}

fn order_steps_by_dependencies(
    steps: Vec<MigrationStep>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
) -> anyhow::Result<Vec<MigrationStep>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut id_to_indices: BTreeMap<&DbObjectId, Vec<usize>> = BTreeMap::new();
    let nodes: Vec<_> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            id_to_indices.entry(&step.id).or_default().push(i);
            graph.add_node(i)
        })
        .collect();

    let mut missing_deps: BTreeSet<(&DbObjectId, &DbObjectId)> = BTreeSet::new();
    for (i, step) in steps.iter().enumerate() {
        let is_drop = step.kind == OperationKind::Drop;
        let catalog = if is_drop { old_catalog } else { new_catalog };

        for dep in catalog.dependencies(&step.id) {
            match id_to_indices.get(dep) {
                Some(indices) => {
                    for &dep_i in indices {
                        let dep_kind = steps[dep_i].kind;
                        if is_drop && dep_kind != OperationKind::Create {
                            // Drops go before the drops and alters of what they need.
                            graph.add_edge(nodes[i], nodes[dep_i], ());
                        } else if !is_drop && dep_kind != OperationKind::Drop {
                            graph.add_edge(nodes[dep_i], nodes[i], ());
                        }
                    }
                }
                None if !catalog.contains_id(dep) => {
                    missing_deps.insert((&step.id, dep));
                }
                None => {}
            }
        }
    }

    for (object_id, missing_dep) in &missing_deps {
        warn!("{object_id} depends on {missing_dep} which is not in the catalog; ignoring");
    }

    // Same object: drop, then create, then alter.
    for indices in id_to_indices.values() {
        for &a in indices {
            for &b in indices {
                if steps[a].kind.rank() < steps[b].kind.rank() {
                    graph.add_edge(nodes[a], nodes[b], ());
                }
            }
        }
    }

    // A dropped child makes room for a created sibling (primary keys,
    // clustered indexes, names reused under another kind).
    let mut parents: BTreeMap<&DbObjectId, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for (i, step) in steps.iter().enumerate() {
        let catalog = if step.kind == OperationKind::Drop { old_catalog } else { new_catalog };
        if let Some(parent) = catalog.parent(&step.id) {
            let entry = parents.entry(parent).or_default();
            match step.kind {
                OperationKind::Drop => entry.0.push(i),
                OperationKind::Create => entry.1.push(i),
                OperationKind::Alter => {}
            }
        }
    }
    for (drops, creates) in parents.values() {
        for &d in drops {
            for &c in creates {
                graph.add_edge(nodes[d], nodes[c], ());
            }
        }
    }

    // Extensions provide types and functions to everything but schemas.
    let extension_creates: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind == OperationKind::Create && s.id.kind == StatementType::Extension)
        .map(|(i, _)| i)
        .collect();
    for &ext_i in &extension_creates {
        for (i, step) in steps.iter().enumerate() {
            if step.kind == OperationKind::Create && step.id.schema.is_some() {
                graph.add_edge(nodes[ext_i], nodes[i], ());
            }
        }
    }

    // An owned sequence comes back after its old owner is dropped and before
    // the table whose defaults call it.
    for (i, step) in steps.iter().enumerate() {
        if step.kind != OperationKind::Create || step.id.kind != StatementType::Sequence {
            continue;
        }
        for owner in sequence_owner(old_catalog, &step.id).into_iter().flatten() {
            for &j in id_to_indices.get(&owner).into_iter().flatten() {
                if steps[j].kind == OperationKind::Drop {
                    graph.add_edge(nodes[j], nodes[i], ());
                }
            }
        }
        for owner in sequence_owner(new_catalog, &step.id).into_iter().flatten() {
            for &j in id_to_indices.get(&owner).into_iter().flatten() {
                if steps[j].kind != OperationKind::Drop {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| {
        let step = &steps[graph[cycle.node_id()]];
        anyhow::anyhow!(
            "Dependency cycle detected involving the {} of {}. Check for circular references between objects.",
            step.kind,
            step.id
        )
    })?;

    let mut slots: Vec<Option<MigrationStep>> = steps.into_iter().map(Some).collect();
    Ok(sorted
        .into_iter()
        .filter_map(|node| slots[graph[node]].take())
        .collect())
}
