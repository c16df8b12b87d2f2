//! Per-object decisions and the migration steps emitted for them.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::catalog::id::{DbObjectId, StatementType};
use crate::catalog::{AnyStatement, Catalog};
use crate::config::Settings;
use crate::diff::{ObjectState, context_for};
use crate::render::{SqlScript, create_any, drop_any};

/// What happens to one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Create,
    Drop,
    Recreate,
    /// In-place change; `script` holds the statements already rendered.
    Alter { state: ObjectState, script: SqlScript },
}

impl Decision {
    pub fn state(&self) -> ObjectState {
        match self {
            Decision::Recreate => ObjectState::Recreate,
            Decision::Alter { state, .. } => *state,
            Decision::Create | Decision::Drop => ObjectState::Nothing,
        }
    }

    /// The object is removed from the database, for good or to be rebuilt.
    pub fn drops(&self) -> bool {
        matches!(self, Decision::Drop | Decision::Recreate)
    }

    /// The object is (re)built from its full definition.
    pub fn creates(&self) -> bool {
        matches!(self, Decision::Create | Decision::Recreate)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Create => f.write_str("CREATE"),
            Decision::Drop => f.write_str("DROP"),
            Decision::Recreate => f.write_str("RECREATE"),
            Decision::Alter { state, script } => {
                write!(f, "{state} ({} statements)", script.len())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Drop,
    Create,
    Alter,
}

impl OperationKind {
    /// Position among the steps of one object: drop, create, alter.
    pub fn rank(self) -> u8 {
        match self {
            OperationKind::Drop => 0,
            OperationKind::Create => 1,
            OperationKind::Alter => 2,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Drop => "drop",
            OperationKind::Create => "create",
            OperationKind::Alter => "alter",
        })
    }
}

/// One unit of the migration: the statements for one operation on one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    pub id: DbObjectId,
    pub kind: OperationKind,
    pub script: SqlScript,
}

impl MigrationStep {
    pub fn new(id: DbObjectId, kind: OperationKind, script: SqlScript) -> Self {
        Self { id, kind, script }
    }

    pub fn is_drop(&self) -> bool {
        self.kind == OperationKind::Drop
    }

    pub fn is_create(&self) -> bool {
        self.kind == OperationKind::Create
    }

    /// Foreign key creations, which run after every other step so that
    /// tables referencing each other can be created first.
    pub fn is_relationship(&self, new_catalog: &Catalog) -> bool {
        self.is_create()
            && new_catalog.get(&self.id).is_some_and(|entry| {
                matches!(entry.statement, AnyStatement::Constraint(c) if c.foreign_key_ref().is_some())
            })
    }
}

fn ancestor_matches(
    catalog: &Catalog,
    id: &DbObjectId,
    decisions: &BTreeMap<DbObjectId, Decision>,
    pred: impl Fn(&Decision) -> bool,
) -> bool {
    catalog
        .ancestors(id)
        .into_iter()
        .any(|a| decisions.get(a).is_some_and(&pred))
}

fn is_default_schema(catalog: &Catalog, id: &DbObjectId) -> bool {
    id.kind == StatementType::Schema && id.name == catalog.dialect().default_schema()
}

/// PG drops a sequence together with the table or column owning it.
fn dropped_with_owner(
    id: &DbObjectId,
    old_catalog: &Catalog,
    decisions: &BTreeMap<DbObjectId, Decision>,
) -> bool {
    let Some(AnyStatement::Sequence(sequence)) = old_catalog.get(id).map(|e| e.statement) else {
        return false;
    };
    let drops = |owner: &DbObjectId| decisions.get(owner).is_some_and(Decision::drops);
    sequence
        .owned_by
        .as_ref()
        .is_some_and(|owner| drops(&owner.table.table_id()) || drops(&owner.column_id()))
}

fn drop_step(
    id: &DbObjectId,
    old_catalog: &Catalog,
    decisions: &BTreeMap<DbObjectId, Decision>,
    settings: &Settings,
) -> Option<MigrationStep> {
    if is_default_schema(old_catalog, id)
        || ancestor_matches(old_catalog, id, decisions, Decision::drops)
        || dropped_with_owner(id, old_catalog, decisions)
    {
        return None;
    }
    let entry = old_catalog.get(id)?;
    let ctx = context_for(old_catalog, id, settings);
    let mut script = SqlScript::new();
    drop_any(entry.statement, &ctx, &mut script);
    Some(MigrationStep::new(id.clone(), OperationKind::Drop, script))
}

fn create_step(
    id: &DbObjectId,
    new_catalog: &Catalog,
    decisions: &BTreeMap<DbObjectId, Decision>,
    settings: &Settings,
) -> Option<MigrationStep> {
    // Columns of a new table are part of its CREATE TABLE.
    if is_default_schema(new_catalog, id)
        || (id.kind == StatementType::Column
            && ancestor_matches(new_catalog, id, decisions, Decision::creates))
    {
        return None;
    }
    let entry = new_catalog.get(id)?;
    let ctx = context_for(new_catalog, id, settings);
    let mut script = SqlScript::new();
    create_any(entry.statement, &ctx, &mut script);
    Some(MigrationStep::new(id.clone(), OperationKind::Create, script))
}

/// Turn decisions into steps, leaving out what a parent's drop or create
/// already covers.
pub fn build_steps(
    decisions: &BTreeMap<DbObjectId, Decision>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
    settings: &Settings,
) -> Vec<MigrationStep> {
    let mut steps = Vec::new();
    for (id, decision) in decisions {
        match decision {
            Decision::Drop => steps.extend(drop_step(id, old_catalog, decisions, settings)),
            Decision::Create => steps.extend(create_step(id, new_catalog, decisions, settings)),
            Decision::Recreate => {
                steps.extend(drop_step(id, old_catalog, decisions, settings));
                steps.extend(create_step(id, new_catalog, decisions, settings));
            }
            Decision::Alter { script, .. } => {
                if ancestor_matches(new_catalog, id, decisions, Decision::creates) {
                    debug!("Skipping alter of {id}; its parent is rebuilt");
                    continue;
                }
                steps.push(MigrationStep::new(
                    id.clone(),
                    OperationKind::Alter,
                    script.clone(),
                ));
            }
        }
    }
    steps
}
