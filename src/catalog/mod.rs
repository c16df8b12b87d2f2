//! In-memory object model.
//!
//! A [`Database`] is a strict ownership tree built through validating
//! builders. [`Catalog`] flattens one tree into a map keyed by
//! [`DbObjectId`] together with forward and reverse dependency maps, which is
//! the shape the diff engine walks.

use std::collections::BTreeMap;

use tracing::warn;

use crate::catalog::assembly::Assembly;
use crate::catalog::column::Column;
use crate::catalog::constraint::Constraint;
use crate::catalog::custom_type::{CustomType, TypeKind};
use crate::catalog::domain::Domain;
use crate::catalog::extension::Extension;
use crate::catalog::function::Function;
use crate::catalog::id::{DbObjectId, StatementType};
use crate::catalog::index::Index;
use crate::catalog::policy::Policy;
use crate::catalog::privilege::Privilege;
use crate::catalog::role::{Role, User};
use crate::catalog::schema::Schema;
use crate::catalog::sequence::Sequence;
use crate::catalog::statement::{Children, Container};
use crate::catalog::statistics::Statistics;
use crate::catalog::table::Table;
use crate::catalog::triggers::{Trigger, TriggerFlavor};
use crate::catalog::utils::DependencyBuilder;
use crate::catalog::view::View;
use crate::dialect::Dialect;
use crate::error::{ModelError, ModelResult};

pub mod assembly;
pub mod column;
pub mod comments;
pub mod constraint;
pub mod custom_type;
pub mod digest;
pub mod domain;
pub mod extension;
pub mod function;
pub mod id;
pub mod index;
pub mod policy;
pub mod privilege;
pub mod role;
pub mod schema;
pub mod sequence;
pub mod statement;
pub mod statistics;
pub mod table;
pub mod triggers;
pub mod utils;
pub mod view;

/// Root of an object tree for one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    dialect: Dialect,
    schemas: BTreeMap<String, Schema>,
    extensions: BTreeMap<String, Extension>,
    roles: BTreeMap<String, Role>,
    users: BTreeMap<String, User>,
    assemblies: BTreeMap<String, Assembly>,
}

impl Database {
    pub fn builder(dialect: Dialect) -> DatabaseBuilder {
        DatabaseBuilder {
            database: Database {
                dialect,
                schemas: BTreeMap::new(),
                extensions: BTreeMap::new(),
                roles: BTreeMap::new(),
                users: BTreeMap::new(),
                assemblies: BTreeMap::new(),
            },
        }
    }

    /// A database holding nothing, e.g. the old side of an initial deployment.
    pub fn empty(dialect: Dialect) -> Self {
        Self::builder(dialect).build()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.values()
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn assemblies(&self) -> impl Iterator<Item = &Assembly> {
        self.assemblies.values()
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.schema(schema).and_then(|s| s.table(name))
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    database: Database,
}

const DATABASE_LABEL: &str = "database";

impl DatabaseBuilder {
    fn require(&self, dialect: Dialect, kind: StatementType) -> ModelResult<()> {
        if self.database.dialect == dialect {
            Ok(())
        } else {
            Err(ModelError::UnsupportedChild {
                parent: DATABASE_LABEL.to_string(),
                kind,
                dialect: self.database.dialect,
            })
        }
    }

    fn insert<T>(
        map: &mut BTreeMap<String, T>,
        kind: StatementType,
        name: &str,
        value: T,
    ) -> ModelResult<()> {
        statement::insert_unique(map, DATABASE_LABEL.to_string(), kind, name, value)
    }

    pub fn schema(mut self, schema: Schema) -> ModelResult<Self> {
        check_schema_dialect(self.database.dialect, &schema)?;
        let name = schema.name().to_string();
        Self::insert(&mut self.database.schemas, StatementType::Schema, &name, schema)?;
        Ok(self)
    }

    pub fn extension(mut self, extension: Extension) -> ModelResult<Self> {
        self.require(Dialect::Pg, StatementType::Extension)?;
        let name = extension.name().to_string();
        Self::insert(
            &mut self.database.extensions,
            StatementType::Extension,
            &name,
            extension,
        )?;
        Ok(self)
    }

    pub fn role(mut self, role: Role) -> ModelResult<Self> {
        self.require(Dialect::Ms, StatementType::Role)?;
        let name = role.name().to_string();
        Self::insert(&mut self.database.roles, StatementType::Role, &name, role)?;
        Ok(self)
    }

    pub fn user(mut self, user: User) -> ModelResult<Self> {
        self.require(Dialect::Ms, StatementType::User)?;
        let name = user.name().to_string();
        Self::insert(&mut self.database.users, StatementType::User, &name, user)?;
        Ok(self)
    }

    pub fn assembly(mut self, assembly: Assembly) -> ModelResult<Self> {
        self.require(Dialect::Ms, StatementType::Assembly)?;
        let name = assembly.name().to_string();
        Self::insert(
            &mut self.database.assemblies,
            StatementType::Assembly,
            &name,
            assembly,
        )?;
        Ok(self)
    }

    pub fn build(self) -> Database {
        self.database
    }
}

fn mismatch(expected: Dialect, found: Dialect, object: DbObjectId) -> ModelResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::DialectMismatch {
            expected,
            found,
            object,
        })
    }
}

fn check_children_dialect(
    dialect: Dialect,
    schema: &str,
    parent: &str,
    children: &Children,
) -> ModelResult<()> {
    for trigger in children.triggers() {
        let found = match trigger.flavor {
            TriggerFlavor::Pg(_) => Dialect::Pg,
            TriggerFlavor::Ms(_) => Dialect::Ms,
        };
        let id = DbObjectId::table_child(StatementType::Trigger, schema, parent, trigger.name());
        mismatch(dialect, found, id)?;
    }
    Ok(())
}

/// Every flavoured body in the schema must match the database dialect.
fn check_schema_dialect(dialect: Dialect, schema: &Schema) -> ModelResult<()> {
    let s = schema.name();
    for table in schema.tables() {
        mismatch(dialect, table.dialect(), DbObjectId::table(s, table.name()))?;
        for column in table.columns() {
            mismatch(
                dialect,
                column.dialect(),
                DbObjectId::column(s, table.name(), column.name()),
            )?;
        }
        check_children_dialect(dialect, s, table.name(), table.children())?;
    }
    for view in schema.views() {
        mismatch(dialect, view.dialect(), DbObjectId::view(s, view.name()))?;
        check_children_dialect(dialect, s, view.name(), view.children())?;
    }
    for (signature, function) in schema.functions() {
        let id = DbObjectId::in_schema(function.kind.statement_type(), s, signature);
        mismatch(dialect, function.dialect(), id)?;
    }
    for custom_type in schema.types() {
        let id = DbObjectId::in_schema(StatementType::Type, s, custom_type.name());
        mismatch(dialect, custom_type.dialect(), id)?;
    }
    for domain in schema.domains() {
        let id = DbObjectId::in_schema(StatementType::Domain, s, domain.name());
        mismatch(dialect, Dialect::Pg, id)?;
    }
    Ok(())
}

/// A borrowed reference to any statement in a tree.
#[derive(Debug, Clone, Copy)]
pub enum AnyStatement<'a> {
    Schema(&'a Schema),
    Extension(&'a Extension),
    Role(&'a Role),
    User(&'a User),
    Assembly(&'a Assembly),
    Table(&'a Table),
    Column(&'a Column),
    Constraint(&'a Constraint),
    Index(&'a Index),
    Trigger(&'a Trigger),
    Policy(&'a Policy),
    Statistics(&'a Statistics),
    Sequence(&'a Sequence),
    Function(&'a Function),
    View(&'a View),
    Type(&'a CustomType),
    Domain(&'a Domain),
}

/// Apply the same expression to whichever statement is inside.
macro_rules! with_statement {
    ($value:expr, $s:ident => $body:expr) => {
        match $value {
            AnyStatement::Schema($s) => $body,
            AnyStatement::Extension($s) => $body,
            AnyStatement::Role($s) => $body,
            AnyStatement::User($s) => $body,
            AnyStatement::Assembly($s) => $body,
            AnyStatement::Table($s) => $body,
            AnyStatement::Column($s) => $body,
            AnyStatement::Constraint($s) => $body,
            AnyStatement::Index($s) => $body,
            AnyStatement::Trigger($s) => $body,
            AnyStatement::Policy($s) => $body,
            AnyStatement::Statistics($s) => $body,
            AnyStatement::Sequence($s) => $body,
            AnyStatement::Function($s) => $body,
            AnyStatement::View($s) => $body,
            AnyStatement::Type($s) => $body,
            AnyStatement::Domain($s) => $body,
        }
    };
}
pub(crate) use with_statement;

impl<'a> AnyStatement<'a> {
    pub fn kind(&self) -> StatementType {
        match self {
            AnyStatement::Schema(_) => StatementType::Schema,
            AnyStatement::Extension(_) => StatementType::Extension,
            AnyStatement::Role(_) => StatementType::Role,
            AnyStatement::User(_) => StatementType::User,
            AnyStatement::Assembly(_) => StatementType::Assembly,
            AnyStatement::Table(_) => StatementType::Table,
            AnyStatement::Column(_) => StatementType::Column,
            AnyStatement::Constraint(_) => StatementType::Constraint,
            AnyStatement::Index(_) => StatementType::Index,
            AnyStatement::Trigger(_) => StatementType::Trigger,
            AnyStatement::Policy(_) => StatementType::Policy,
            AnyStatement::Statistics(_) => StatementType::Statistics,
            AnyStatement::Sequence(_) => StatementType::Sequence,
            AnyStatement::Function(f) => f.kind.statement_type(),
            AnyStatement::View(_) => StatementType::View,
            AnyStatement::Type(_) => StatementType::Type,
            AnyStatement::Domain(_) => StatementType::Domain,
        }
    }

    pub fn name(&self) -> &'a str {
        with_statement!(*self, s => s.name())
    }

    pub fn owner(&self) -> Option<&'a str> {
        with_statement!(*self, s => s.owner())
    }

    pub fn comment(&self) -> Option<&'a str> {
        with_statement!(*self, s => s.comment())
    }

    pub fn privileges(&self) -> &'a std::collections::BTreeSet<Privilege> {
        with_statement!(*self, s => s.privileges())
    }

    pub fn depends_on(&self) -> &'a [DbObjectId] {
        with_statement!(*self, s => s.depends_on())
    }

    pub fn digest(&self) -> &'a [u8; 16] {
        with_statement!(*self, s => s.digest())
    }

    /// Structural equality; statements of different kinds are never equal.
    pub fn same_as(&self, other: &AnyStatement<'_>) -> bool {
        match (self, other) {
            (AnyStatement::Schema(a), AnyStatement::Schema(b)) => a == b,
            (AnyStatement::Extension(a), AnyStatement::Extension(b)) => a == b,
            (AnyStatement::Role(a), AnyStatement::Role(b)) => a == b,
            (AnyStatement::User(a), AnyStatement::User(b)) => a == b,
            (AnyStatement::Assembly(a), AnyStatement::Assembly(b)) => a == b,
            (AnyStatement::Table(a), AnyStatement::Table(b)) => a == b,
            (AnyStatement::Column(a), AnyStatement::Column(b)) => a == b,
            (AnyStatement::Constraint(a), AnyStatement::Constraint(b)) => a == b,
            (AnyStatement::Index(a), AnyStatement::Index(b)) => a == b,
            (AnyStatement::Trigger(a), AnyStatement::Trigger(b)) => a == b,
            (AnyStatement::Policy(a), AnyStatement::Policy(b)) => a == b,
            (AnyStatement::Statistics(a), AnyStatement::Statistics(b)) => a == b,
            (AnyStatement::Sequence(a), AnyStatement::Sequence(b)) => a == b,
            (AnyStatement::Function(a), AnyStatement::Function(b)) => a == b,
            (AnyStatement::View(a), AnyStatement::View(b)) => a == b,
            (AnyStatement::Type(a), AnyStatement::Type(b)) => a == b,
            (AnyStatement::Domain(a), AnyStatement::Domain(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_table(&self) -> Option<&'a Table> {
        match self {
            AnyStatement::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// One flattened object.
#[derive(Debug, Clone)]
pub struct ObjectEntry<'a> {
    pub statement: AnyStatement<'a>,
    /// Owning object for tree children (columns, constraints, ...). Schemas
    /// are tracked as dependencies, not parents.
    pub parent: Option<DbObjectId>,
}

/// Flattened view of one [`Database`].
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    pub database: &'a Database,
    pub objects: BTreeMap<DbObjectId, ObjectEntry<'a>>,
    pub forward_deps: BTreeMap<DbObjectId, Vec<DbObjectId>>,
    pub reverse_deps: BTreeMap<DbObjectId, Vec<DbObjectId>>,
}

struct Flattener<'a> {
    database: &'a Database,
    objects: BTreeMap<DbObjectId, ObjectEntry<'a>>,
    forward: BTreeMap<DbObjectId, Vec<DbObjectId>>,
}

impl<'a> Flattener<'a> {
    fn deps(&self) -> DependencyBuilder {
        DependencyBuilder::new(self.database.dialect)
    }

    fn insert(
        &mut self,
        id: DbObjectId,
        statement: AnyStatement<'a>,
        parent: Option<DbObjectId>,
        mut deps: DependencyBuilder,
    ) {
        deps.extend(statement.depends_on());
        if let Some(parent) = &parent {
            deps.add(parent.clone());
        }
        self.forward.insert(id.clone(), deps.build());
        self.objects.insert(id, ObjectEntry { statement, parent });
    }

    fn children(&mut self, schema: &str, owner: &str, owner_id: &DbObjectId, children: &'a Children) {
        let child = |kind: StatementType, name: &str| DbObjectId::table_child(kind, schema, owner, name);
        for c in children.constraints() {
            let mut deps = self.deps();
            deps.extend(&c.referenced_ids());
            if let Some(fk) = c.foreign_key_ref() {
                for column in &fk.columns {
                    deps.add(DbObjectId::column(schema, owner, column));
                }
            }
            self.insert(
                child(StatementType::Constraint, c.name()),
                AnyStatement::Constraint(c),
                Some(owner_id.clone()),
                deps,
            );
        }
        for i in children.indexes() {
            let id = child(StatementType::Index, i.name());
            let deps = self.deps();
            self.insert(id, AnyStatement::Index(i), Some(owner_id.clone()), deps);
        }
        for t in children.triggers() {
            let id = child(StatementType::Trigger, t.name());
            let deps = self.deps();
            self.insert(id, AnyStatement::Trigger(t), Some(owner_id.clone()), deps);
        }
        for p in children.policies() {
            let id = child(StatementType::Policy, p.name());
            let deps = self.deps();
            self.insert(id, AnyStatement::Policy(p), Some(owner_id.clone()), deps);
        }
        for st in children.statistics() {
            let id = child(StatementType::Statistics, st.name());
            let deps = self.deps();
            self.insert(id, AnyStatement::Statistics(st), Some(owner_id.clone()), deps);
        }
    }

    fn table(&mut self, schema: &str, schema_id: &DbObjectId, table: &'a Table) {
        let table_id = DbObjectId::table(schema, table.name());
        let mut deps = self.deps();
        deps.add(schema_id.clone());
        for parent in table.parents() {
            if self.database.table(&parent.schema, &parent.name).is_some() {
                deps.add(parent.table_id());
            } else {
                warn!(
                    "Parent table {} of {} not found; treating the relationship as absent",
                    parent, table_id
                );
            }
        }
        self.insert(table_id.clone(), AnyStatement::Table(table), None, deps);

        for column in table.columns() {
            let id = DbObjectId::column(schema, table.name(), column.name());
            let mut deps = self.deps();
            if column.is_inherited() {
                for parent in table.parents() {
                    let inherited_from = self
                        .database
                        .table(&parent.schema, &parent.name)
                        .and_then(|p| p.column(column.name()));
                    if inherited_from.is_some() {
                        deps.add(DbObjectId::column(&parent.schema, &parent.name, column.name()));
                    }
                }
            }
            self.insert(id, AnyStatement::Column(column), Some(table_id.clone()), deps);
        }
        self.children(schema, table.name(), &table_id, table.children());
    }

    fn schema(&mut self, schema: &'a Schema) {
        let s = schema.name();
        let schema_id = DbObjectId::schema(s);
        let deps = self.deps();
        self.insert(schema_id.clone(), AnyStatement::Schema(schema), None, deps);

        for table in schema.tables() {
            self.table(s, &schema_id, table);
        }
        for view in schema.views() {
            let view_id = DbObjectId::view(s, view.name());
            let mut deps = self.deps();
            deps.add(schema_id.clone());
            self.insert(view_id.clone(), AnyStatement::View(view), None, deps);
            self.children(s, view.name(), &view_id, view.children());
        }
        for (signature, function) in schema.functions() {
            let id = DbObjectId::in_schema(function.kind.statement_type(), s, signature);
            let mut deps = self.deps();
            deps.add(schema_id.clone());
            if let Some(clr) = function.ms_attrs().and_then(|ms| ms.clr.as_ref()) {
                deps.add(DbObjectId::database_level(StatementType::Assembly, &clr.assembly));
            }
            self.insert(id, AnyStatement::Function(function), None, deps);
        }
        for sequence in schema.sequences() {
            let id = DbObjectId::in_schema(StatementType::Sequence, s, sequence.name());
            let mut deps = self.deps();
            deps.add(schema_id.clone());
            self.insert(id, AnyStatement::Sequence(sequence), None, deps);
        }
        for custom_type in schema.types() {
            let id = DbObjectId::in_schema(StatementType::Type, s, custom_type.name());
            let mut deps = self.deps();
            deps.add(schema_id.clone());
            if let TypeKind::Clr { assembly, .. } = &custom_type.kind {
                deps.add(DbObjectId::database_level(StatementType::Assembly, assembly));
            }
            self.insert(id, AnyStatement::Type(custom_type), None, deps);
        }
        for domain in schema.domains() {
            let id = DbObjectId::in_schema(StatementType::Domain, s, domain.name());
            let mut deps = self.deps();
            deps.add(schema_id.clone());
            self.insert(id, AnyStatement::Domain(domain), None, deps);
        }
    }
}

impl<'a> Catalog<'a> {
    pub fn new(database: &'a Database) -> Self {
        let mut flat = Flattener {
            database,
            objects: BTreeMap::new(),
            forward: BTreeMap::new(),
        };

        for extension in database.extensions() {
            let id = DbObjectId::database_level(StatementType::Extension, extension.name());
            let mut deps = flat.deps();
            if let Some(schema) = &extension.schema {
                deps.add(DbObjectId::schema(schema));
            }
            flat.insert(id, AnyStatement::Extension(extension), None, deps);
        }
        for role in database.roles() {
            let id = DbObjectId::database_level(StatementType::Role, role.name());
            let deps = flat.deps();
            flat.insert(id, AnyStatement::Role(role), None, deps);
        }
        for user in database.users() {
            let id = DbObjectId::database_level(StatementType::User, user.name());
            let deps = flat.deps();
            flat.insert(id, AnyStatement::User(user), None, deps);
        }
        for assembly in database.assemblies() {
            let id = DbObjectId::database_level(StatementType::Assembly, assembly.name());
            let deps = flat.deps();
            flat.insert(id, AnyStatement::Assembly(assembly), None, deps);
        }
        for schema in database.schemas() {
            flat.schema(schema);
        }

        let mut reverse: BTreeMap<DbObjectId, Vec<DbObjectId>> = BTreeMap::new();
        for (id, deps) in &flat.forward {
            for dep in deps {
                reverse.entry(dep.clone()).or_default().push(id.clone());
            }
        }

        Self {
            database,
            objects: flat.objects,
            forward_deps: flat.forward,
            reverse_deps: reverse,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.database.dialect()
    }

    pub fn get(&self, id: &DbObjectId) -> Option<&ObjectEntry<'a>> {
        self.objects.get(id)
    }

    /// Check if the catalog contains an object with the given ID
    pub fn contains_id(&self, id: &DbObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn parent(&self, id: &DbObjectId) -> Option<&DbObjectId> {
        self.objects.get(id).and_then(|e| e.parent.as_ref())
    }

    /// Owning objects from the direct parent upwards.
    pub fn ancestors(&self, id: &DbObjectId) -> Vec<&DbObjectId> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.parent(parent);
        }
        chain
    }

    /// Objects this one requires, explicit and implicit.
    pub fn dependencies(&self, id: &DbObjectId) -> &[DbObjectId] {
        self.forward_deps.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Objects that require this one.
    pub fn dependents(&self, id: &DbObjectId) -> &[DbObjectId] {
        self.reverse_deps.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The statement that owns a child, resolved to its entry.
    pub fn parent_statement(&self, id: &DbObjectId) -> Option<AnyStatement<'a>> {
        self.parent(id)
            .and_then(|p| self.objects.get(p))
            .map(|e| e.statement)
    }
}
