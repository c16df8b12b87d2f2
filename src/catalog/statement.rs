//! The generic statement wrapper shared by every object kind.
//!
//! A [`Statement`] carries the attributes every database object has (name,
//! owner, comment, privileges, dependencies) plus a kind-specific body. It is
//! built once through [`StatementBuilder`] and never mutated afterwards, so
//! its structural digest is computed exactly once.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::catalog::constraint::Constraint;
use crate::catalog::digest::{digest_of, to_hex};
use crate::catalog::id::{DbObjectId, StatementType};
use crate::catalog::index::Index;
use crate::catalog::policy::Policy;
use crate::catalog::privilege::Privilege;
use crate::catalog::statistics::Statistics;
use crate::catalog::triggers::Trigger;
use crate::dialect::Dialect;
use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone)]
pub struct Statement<B> {
    name: String,
    owner: Option<String>,
    comment: Option<String>,
    privileges: BTreeSet<Privilege>,
    depends_on: Vec<DbObjectId>,
    body: B,
    digest: [u8; 16],
}

/// The fields that take part in equality and in the digest. Dependencies are
/// reference tracking, not object content, and are left out.
#[derive(PartialEq, Eq, Hash)]
struct StatementKey<'a, B> {
    name: &'a str,
    owner: &'a Option<String>,
    comment: &'a Option<String>,
    privileges: &'a BTreeSet<Privilege>,
    body: &'a B,
}

impl<B> Statement<B> {
    fn key(&self) -> StatementKey<'_, B> {
        StatementKey {
            name: &self.name,
            owner: &self.owner,
            comment: &self.comment,
            privileges: &self.privileges,
            body: &self.body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn privileges(&self) -> &BTreeSet<Privilege> {
        &self.privileges
    }

    pub fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn digest(&self) -> &[u8; 16] {
        &self.digest
    }

    pub fn fingerprint(&self) -> String {
        to_hex(&self.digest)
    }
}

impl<B: Hash> Statement<B> {
    pub fn builder(name: impl Into<String>, body: B) -> StatementBuilder<B> {
        StatementBuilder {
            name: name.into(),
            owner: None,
            comment: None,
            privileges: BTreeSet::new(),
            depends_on: Vec::new(),
            body,
        }
    }
}

impl<B: Hash + Clone> Statement<B> {
    /// Start a builder from this statement, e.g. to derive a modified copy.
    pub fn to_builder(&self) -> StatementBuilder<B> {
        StatementBuilder {
            name: self.name.clone(),
            owner: self.owner.clone(),
            comment: self.comment.clone(),
            privileges: self.privileges.clone(),
            depends_on: self.depends_on.clone(),
            body: self.body.clone(),
        }
    }
}

impl<B: PartialEq> PartialEq for Statement<B> {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.key() == other.key()
    }
}

impl<B: Eq> Eq for Statement<B> {}

impl<B> Hash for Statement<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(&self.digest);
    }
}

impl<B> Deref for Statement<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.body
    }
}

#[derive(Debug, Clone)]
pub struct StatementBuilder<B> {
    name: String,
    owner: Option<String>,
    comment: Option<String>,
    privileges: BTreeSet<Privilege>,
    depends_on: Vec<DbObjectId>,
    body: B,
}

impl<B: Hash> StatementBuilder<B> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn without_owner(mut self) -> Self {
        self.owner = None;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn without_comment(mut self) -> Self {
        self.comment = None;
        self
    }

    pub fn privilege(mut self, privilege: Privilege) -> Self {
        self.privileges.insert(privilege);
        self
    }

    pub fn without_privileges(mut self) -> Self {
        self.privileges.clear();
        self
    }

    pub fn depends_on(mut self, id: DbObjectId) -> Self {
        if !self.depends_on.contains(&id) {
            self.depends_on.push(id);
        }
        self
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Apply a change to the body before the statement is sealed.
    pub fn with_body(mut self, f: impl FnOnce(&mut B)) -> Self {
        f(&mut self.body);
        self
    }

    pub fn build(self) -> Statement<B> {
        let mut statement = Statement {
            name: self.name,
            owner: self.owner,
            comment: self.comment,
            privileges: self.privileges,
            depends_on: self.depends_on,
            body: self.body,
            digest: [0; 16],
        };
        statement.digest = digest_of(&statement.key());
        statement
    }
}

/// Children owned by a statement container (table or view).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Children {
    pub(crate) constraints: BTreeMap<String, Constraint>,
    pub(crate) indexes: BTreeMap<String, Index>,
    pub(crate) triggers: BTreeMap<String, Trigger>,
    pub(crate) statistics: BTreeMap<String, Statistics>,
    pub(crate) policies: BTreeMap<String, Policy>,
}

impl Children {
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub fn indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.values()
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.values()
    }

    pub fn statistics(&self) -> impl Iterator<Item = &Statistics> {
        self.statistics.values()
    }

    pub fn policies(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.get(name)
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
            && self.indexes.is_empty()
            && self.triggers.is_empty()
            && self.statistics.is_empty()
            && self.policies.is_empty()
    }
}

/// A statement that owns constraints, indexes, triggers, statistics or policies.
pub trait Container {
    const KIND: StatementType;

    fn dialect(&self) -> Dialect;
    fn children(&self) -> &Children;
    fn children_mut(&mut self) -> &mut Children;

    /// Whether this container can own a child of `kind`.
    fn supports(&self, kind: StatementType) -> bool;
}

pub(crate) fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    parent: String,
    kind: StatementType,
    name: &str,
    child: T,
) -> ModelResult<()> {
    if map.contains_key(name) {
        return Err(ModelError::DuplicateChild {
            parent,
            kind,
            name: name.to_string(),
        });
    }
    map.insert(name.to_string(), child);
    Ok(())
}

impl<B: Container + Hash> StatementBuilder<B> {
    fn parent_label(&self) -> String {
        format!("{} {}", B::KIND, self.name)
    }

    fn check_supported(&self, kind: StatementType) -> ModelResult<()> {
        if self.body.supports(kind) {
            Ok(())
        } else {
            Err(ModelError::UnsupportedChild {
                parent: self.parent_label(),
                kind,
                dialect: self.body.dialect(),
            })
        }
    }

    pub fn constraint(mut self, constraint: Constraint) -> ModelResult<Self> {
        self.check_supported(StatementType::Constraint)?;
        let parent = self.parent_label();
        let name = constraint.name().to_string();
        insert_unique(
            &mut self.body.children_mut().constraints,
            parent,
            StatementType::Constraint,
            &name,
            constraint,
        )?;
        Ok(self)
    }

    pub fn index(mut self, index: Index) -> ModelResult<Self> {
        self.check_supported(StatementType::Index)?;
        let parent = self.parent_label();
        let name = index.name().to_string();
        insert_unique(
            &mut self.body.children_mut().indexes,
            parent,
            StatementType::Index,
            &name,
            index,
        )?;
        Ok(self)
    }

    pub fn trigger(mut self, trigger: Trigger) -> ModelResult<Self> {
        self.check_supported(StatementType::Trigger)?;
        let parent = self.parent_label();
        let name = trigger.name().to_string();
        insert_unique(
            &mut self.body.children_mut().triggers,
            parent,
            StatementType::Trigger,
            &name,
            trigger,
        )?;
        Ok(self)
    }

    pub fn statistics(mut self, statistics: Statistics) -> ModelResult<Self> {
        self.check_supported(StatementType::Statistics)?;
        let parent = self.parent_label();
        let name = statistics.name().to_string();
        insert_unique(
            &mut self.body.children_mut().statistics,
            parent,
            StatementType::Statistics,
            &name,
            statistics,
        )?;
        Ok(self)
    }

    pub fn policy(mut self, policy: Policy) -> ModelResult<Self> {
        self.check_supported(StatementType::Policy)?;
        let parent = self.parent_label();
        let name = policy.name().to_string();
        insert_unique(
            &mut self.body.children_mut().policies,
            parent,
            StatementType::Policy,
            &name,
            policy,
        )?;
        Ok(self)
    }
}
