use std::fmt;

use crate::catalog::statement::Statement;

pub type Policy = Statement<PolicyBody>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolicyCommand {
    #[default]
    All,
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for PolicyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyCommand::All => "ALL",
            PolicyCommand::Select => "SELECT",
            PolicyCommand::Insert => "INSERT",
            PolicyCommand::Update => "UPDATE",
            PolicyCommand::Delete => "DELETE",
        })
    }
}

/// Row-level security policy (PostgreSQL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyBody {
    pub command: PolicyCommand,
    pub permissive: bool,
    /// Empty means `PUBLIC`.
    pub roles: Vec<String>,
    pub using: Option<String>,
    pub with_check: Option<String>,
}

impl Default for PolicyBody {
    fn default() -> Self {
        Self {
            command: PolicyCommand::All,
            permissive: true,
            roles: Vec::new(),
            using: None,
            with_check: None,
        }
    }
}
