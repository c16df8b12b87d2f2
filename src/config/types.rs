use serde::{Deserialize, Serialize};

/// Raw settings input - all fields Optional for merging
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsInput {
    pub ignore_column_order: Option<bool>,
    pub ignore_privileges: Option<bool>,
    pub generate_exists: Option<bool>,
    pub generate_exists_do_block: Option<bool>,
    pub drop_if_exists: Option<bool>,
    pub concurrently: Option<bool>,
    pub print_using: Option<bool>,
    pub comments_to_end: Option<bool>,
    pub script_in_transaction: Option<bool>,
    pub disable_check_function_bodies: Option<bool>,
}

/// Resolved settings with all defaults applied. Read-only for the rest of
/// the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Column reordering never forces a table rebuild.
    pub ignore_column_order: bool,
    /// Skip privilege statements in both creation and alter SQL.
    pub ignore_privileges: bool,
    /// `IF NOT EXISTS` on creation where the statement supports it.
    pub generate_exists: bool,
    /// Wrap PostgreSQL statements without `IF NOT EXISTS` in a DO block that
    /// swallows the duplicate-object error.
    pub generate_exists_do_block: bool,
    /// `IF EXISTS` on drops.
    pub drop_if_exists: bool,
    /// `CREATE INDEX CONCURRENTLY` on PostgreSQL, `ONLINE = ON` on MS SQL.
    pub concurrently: bool,
    /// `USING column::type` on PostgreSQL column type changes.
    pub print_using: bool,
    /// Comment statements go to the end of the script.
    pub comments_to_end: bool,
    pub script_in_transaction: bool,
    /// `SET check_function_bodies = false;` header on PostgreSQL scripts.
    pub disable_check_function_bodies: bool,
}
