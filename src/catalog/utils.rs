use crate::catalog::id::DbObjectId;
use crate::dialect::Dialect;

/// Builder for constructing dependency lists for database objects.
/// Explicit references come first, implicit ones (parent, schema,
/// inheritance parents, assemblies) are appended during flattening.
pub struct DependencyBuilder {
    dialect: Dialect,
    deps: Vec<DbObjectId>,
}

impl DependencyBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            deps: Vec::new(),
        }
    }

    /// Add a dependency unless it is already present or lives in a system schema.
    pub fn add(&mut self, id: DbObjectId) -> &mut Self {
        let system = id
            .schema_name()
            .is_some_and(|schema| self.dialect.is_system_schema(schema));
        if !system && !self.deps.contains(&id) {
            self.deps.push(id);
        }
        self
    }

    pub fn extend<'a>(&mut self, ids: impl IntoIterator<Item = &'a DbObjectId>) -> &mut Self {
        for id in ids {
            self.add(id.clone());
        }
        self
    }

    /// Build the final dependency list.
    pub fn build(self) -> Vec<DbObjectId> {
        self.deps
    }
}
