//! MS SQL database principals: roles and users.

use std::collections::BTreeSet;

use crate::catalog::statement::Statement;

pub type Role = Statement<RoleBody>;
pub type User = Statement<UserBody>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RoleBody {
    pub members: BTreeSet<String>,
}

impl RoleBody {
    pub fn with_members<S: Into<String>>(members: impl IntoIterator<Item = S>) -> Self {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserBody {
    pub login: Option<String>,
    pub default_schema: Option<String>,
    pub default_language: Option<String>,
    pub allow_encrypted: bool,
    /// Contained database users authenticate with a password.
    pub password: Option<String>,
}

impl UserBody {
    pub fn for_login(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            ..Self::default()
        }
    }
}
