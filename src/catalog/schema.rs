use std::collections::BTreeMap;

use crate::catalog::custom_type::CustomType;
use crate::catalog::domain::Domain;
use crate::catalog::function::Function;
use crate::catalog::id::StatementType;
use crate::catalog::sequence::Sequence;
use crate::catalog::statement::{Statement, StatementBuilder, insert_unique};
use crate::catalog::table::Table;
use crate::catalog::view::View;
use crate::error::{ModelError, ModelResult};

pub type Schema = Statement<SchemaBody>;

/// Objects owned by a schema. Routines are keyed by their signature so PG
/// overloads can coexist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaBody {
    tables: BTreeMap<String, Table>,
    views: BTreeMap<String, View>,
    functions: BTreeMap<String, Function>,
    sequences: BTreeMap<String, Sequence>,
    types: BTreeMap<String, CustomType>,
    domains: BTreeMap<String, Domain>,
}

impl SchemaBody {
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&String, &Function)> {
        self.functions.iter()
    }

    pub fn function(&self, signature: &str) -> Option<&Function> {
        self.functions.get(signature)
    }

    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    pub fn types(&self) -> impl Iterator<Item = &CustomType> {
        self.types.values()
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.views.is_empty()
            && self.functions.is_empty()
            && self.sequences.is_empty()
            && self.types.is_empty()
            && self.domains.is_empty()
    }
}

impl StatementBuilder<SchemaBody> {
    fn schema_label(&self) -> String {
        format!("{} {}", StatementType::Schema, self.name())
    }

    fn relation_taken(&mut self, kind: StatementType, name: &str) -> ModelResult<()> {
        let body = self.body_mut();
        if body.tables.contains_key(name) || body.views.contains_key(name) {
            return Err(ModelError::DuplicateChild {
                parent: self.schema_label(),
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn type_taken(&mut self, kind: StatementType, name: &str) -> ModelResult<()> {
        let body = self.body_mut();
        if body.types.contains_key(name) || body.domains.contains_key(name) {
            return Err(ModelError::DuplicateChild {
                parent: self.schema_label(),
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Tables and views share one namespace.
    pub fn table(mut self, table: Table) -> ModelResult<Self> {
        let name = table.name().to_string();
        self.relation_taken(StatementType::Table, &name)?;
        self.body_mut().tables.insert(name, table);
        Ok(self)
    }

    pub fn view(mut self, view: View) -> ModelResult<Self> {
        let name = view.name().to_string();
        self.relation_taken(StatementType::View, &name)?;
        self.body_mut().views.insert(name, view);
        Ok(self)
    }

    pub fn function(mut self, function: Function) -> ModelResult<Self> {
        let parent = self.schema_label();
        let signature = function.signature(function.name());
        let kind = function.kind.statement_type();
        insert_unique(&mut self.body_mut().functions, parent, kind, &signature, function)?;
        Ok(self)
    }

    pub fn sequence(mut self, sequence: Sequence) -> ModelResult<Self> {
        let parent = self.schema_label();
        let name = sequence.name().to_string();
        insert_unique(
            &mut self.body_mut().sequences,
            parent,
            StatementType::Sequence,
            &name,
            sequence,
        )?;
        Ok(self)
    }

    /// Types and domains share one namespace.
    pub fn custom_type(mut self, custom_type: CustomType) -> ModelResult<Self> {
        let name = custom_type.name().to_string();
        self.type_taken(StatementType::Type, &name)?;
        self.body_mut().types.insert(name, custom_type);
        Ok(self)
    }

    pub fn domain(mut self, domain: Domain) -> ModelResult<Self> {
        let name = domain.name().to_string();
        self.type_taken(StatementType::Domain, &name)?;
        self.body_mut().domains.insert(name, domain);
        Ok(self)
    }
}
