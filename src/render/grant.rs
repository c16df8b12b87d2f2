//! Privilege statements.

use crate::catalog::privilege::Privilege;
use crate::dialect::Dialect;
use crate::render::{ObjectRef, SqlContext, SqlScript};

/// PostgreSQL owners hold every privilege implicitly; explicit grants to the
/// owner are noise in a generated script.
fn is_owner_grant(dialect: Dialect, privilege: &Privilege, owner: Option<&str>) -> bool {
    dialect == Dialect::Pg && owner.is_some_and(|o| o == privilege.grantee)
}

pub fn privilege_sql(
    ctx: &SqlContext<'_>,
    target: &ObjectRef,
    privilege: &Privilege,
) -> Option<String> {
    let on = target.grant_target.as_ref()?;
    Some(privilege.to_sql(ctx.dialect, on, &target.grant_columns))
}

pub fn append_privileges<'p>(
    ctx: &SqlContext<'_>,
    target: &ObjectRef,
    owner: Option<&str>,
    privileges: impl IntoIterator<Item = &'p Privilege>,
    script: &mut SqlScript,
) {
    if ctx.settings.ignore_privileges {
        return;
    }
    for privilege in privileges {
        if is_owner_grant(ctx.dialect, privilege, owner) {
            continue;
        }
        if let Some(sql) = privilege_sql(ctx, target, privilege) {
            script.push(sql);
        }
    }
}
