use std::fmt;

use crate::catalog::statement::Statement;

pub type Assembly = Statement<AssemblyBody>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PermissionSet {
    #[default]
    Safe,
    ExternalAccess,
    Unsafe,
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PermissionSet::Safe => "SAFE",
            PermissionSet::ExternalAccess => "EXTERNAL_ACCESS",
            PermissionSet::Unsafe => "UNSAFE",
        })
    }
}

/// MS SQL CLR assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyBody {
    /// Binary literals (`0x4D5A...`) or file paths, in load order.
    pub binaries: Vec<String>,
    pub permission_set: PermissionSet,
    pub visible: bool,
}

impl AssemblyBody {
    pub fn from_binaries<S: Into<String>>(binaries: impl IntoIterator<Item = S>) -> Self {
        Self {
            binaries: binaries.into_iter().map(Into::into).collect(),
            permission_set: PermissionSet::Safe,
            visible: true,
        }
    }
}
