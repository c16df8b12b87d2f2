//! Ownership statements.

use crate::catalog::id::StatementType;
use crate::dialect::Dialect;
use crate::render::{ObjectRef, SqlContext};

/// MS schemas and roles take their owner in the CREATE statement itself.
pub fn owner_is_inline(dialect: Dialect, kind: StatementType) -> bool {
    dialect == Dialect::Ms && matches!(kind, StatementType::Schema | StatementType::Role)
}

/// Statement handing `target` to `owner`. Dropping an owner has no PG form;
/// on MS it returns schema-scoped objects to the schema owner.
pub fn owner_sql(ctx: &SqlContext<'_>, target: &ObjectRef, owner: Option<&str>) -> Option<String> {
    let on = target.owner_target.as_ref()?;
    match (ctx.dialect, owner) {
        (Dialect::Pg, Some(owner)) => Some(format!("ALTER {on} OWNER TO {}", ctx.quote(owner))),
        (Dialect::Pg, None) => None,
        (Dialect::Ms, Some(owner)) => Some(format!(
            "ALTER AUTHORIZATION ON {on} TO {}",
            ctx.quote(owner)
        )),
        (Dialect::Ms, None) if target.schema_scoped => {
            Some(format!("ALTER AUTHORIZATION ON {on} TO SCHEMA OWNER"))
        }
        (Dialect::Ms, None) => None,
    }
}
