use std::collections::BTreeMap;

use crate::catalog::statement::Statement;

pub type Domain = Statement<DomainBody>;

/// PostgreSQL domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainBody {
    pub base_type: String,
    pub collation: Option<String>,
    pub default: Option<String>,
    pub not_null: bool,
    pub constraints: BTreeMap<String, DomainCheckConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainCheckConstraint {
    /// Check expression without the `CHECK` keyword, e.g. `VALUE > 0`.
    pub expression: String,
    pub not_valid: bool,
}

impl DomainBody {
    pub fn new(base_type: impl Into<String>) -> Self {
        Self {
            base_type: base_type.into(),
            collation: None,
            default: None,
            not_null: false,
            constraints: BTreeMap::new(),
        }
    }

    pub fn with_check(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.constraints.insert(
            name.into(),
            DomainCheckConstraint {
                expression: expression.into(),
                not_valid: false,
            },
        );
        self
    }
}
