//! Grant / revoke / deny entries attached to a statement.

use crate::dialect::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GrantState {
    Grant,
    GrantWithOption,
    Revoke,
    /// MS SQL only.
    Deny,
}

/// One privilege entry. The target object is implied by the statement that
/// owns the entry; `columns` narrows a table privilege to specific columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Privilege {
    pub state: GrantState,
    pub permission: String,
    pub grantee: String,
    pub columns: Vec<String>,
}

impl Privilege {
    pub fn new(state: GrantState, permission: impl Into<String>, grantee: impl Into<String>) -> Self {
        Self {
            state,
            permission: permission.into(),
            grantee: grantee.into(),
            columns: Vec::new(),
        }
    }

    pub fn grant(permission: impl Into<String>, grantee: impl Into<String>) -> Self {
        Self::new(GrantState::Grant, permission, grantee)
    }

    pub fn revoke(permission: impl Into<String>, grantee: impl Into<String>) -> Self {
        Self::new(GrantState::Revoke, permission, grantee)
    }

    pub fn deny(permission: impl Into<String>, grantee: impl Into<String>) -> Self {
        Self::new(GrantState::Deny, permission, grantee)
    }

    pub fn with_grant_option(mut self) -> Self {
        self.state = GrantState::GrantWithOption;
        self
    }

    pub fn on_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// The entry that undoes this one.
    pub fn reverse(&self) -> Privilege {
        let state = match self.state {
            GrantState::Grant | GrantState::GrantWithOption | GrantState::Deny => GrantState::Revoke,
            GrantState::Revoke => GrantState::Grant,
        };
        Privilege {
            state,
            ..self.clone()
        }
    }

    fn grantee_sql(&self, dialect: Dialect) -> String {
        if dialect == Dialect::Pg && self.grantee.eq_ignore_ascii_case("public") {
            "PUBLIC".to_string()
        } else {
            dialect.quote_ident(&self.grantee)
        }
    }

    /// Render the entry against an already formatted target
    /// (`TABLE public.t`, `OBJECT::[dbo].[t]`, ...). `extra_columns` is used
    /// when the owning statement is itself a column.
    pub fn to_sql(&self, dialect: Dialect, target: &str, extra_columns: &[String]) -> String {
        let columns: Vec<&String> = self.columns.iter().chain(extra_columns).collect();
        let column_list = if columns.is_empty() {
            String::new()
        } else {
            format!(" ({})", dialect.quote_list(&columns))
        };
        let grantee = self.grantee_sql(dialect);

        let (verb, preposition) = match self.state {
            GrantState::Grant | GrantState::GrantWithOption => ("GRANT", "TO"),
            GrantState::Revoke => ("REVOKE", "FROM"),
            GrantState::Deny => ("DENY", "TO"),
        };
        let suffix = if self.state == GrantState::GrantWithOption {
            " WITH GRANT OPTION"
        } else {
            ""
        };

        match dialect {
            Dialect::Pg => format!(
                "{verb} {}{column_list} ON {target} {preposition} {grantee}{suffix}",
                self.permission
            ),
            Dialect::Ms => format!(
                "{verb} {} ON {target}{column_list} {preposition} {grantee}{suffix}",
                self.permission
            ),
        }
    }
}
