//! Owner, privilege and comment changes shared by every statement kind.

use crate::catalog::AnyStatement;
use crate::catalog::comments::diff_comments;
use crate::catalog::privilege::Privilege;
use crate::render::comment::append_comment;
use crate::render::grant::append_privileges;
use crate::render::owner::owner_sql;
use crate::render::{SqlContext, SqlScript, object_ref};

/// Append the statements moving the common attributes of `old` to those of
/// `new`. Removed privileges are reversed before added ones are granted.
pub fn append_attribute_alters(
    ctx: &SqlContext<'_>,
    old: AnyStatement<'_>,
    new: AnyStatement<'_>,
    script: &mut SqlScript,
) {
    let target = object_ref(ctx, new);

    if old.owner() != new.owner()
        && let Some(sql) = owner_sql(ctx, &target, new.owner())
    {
        script.push(sql);
    }

    let removed: Vec<Privilege> = old
        .privileges()
        .difference(new.privileges())
        .map(Privilege::reverse)
        .collect();
    append_privileges(ctx, &target, new.owner(), &removed, script);
    append_privileges(
        ctx,
        &target,
        new.owner(),
        new.privileges().difference(old.privileges()),
        script,
    );

    if let Some(action) = diff_comments(&old, &new) {
        append_comment(ctx, &target, &action, old.comment().is_some(), script);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::DbObjectId;
    use crate::catalog::table::{Table, TableBody};
    use crate::config::Settings;
    use crate::dialect::Dialect;

    #[test]
    fn test_owner_privileges_and_comment() {
        let settings = Settings::default();
        let id = DbObjectId::table("public", "users");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let old = Table::builder("users", TableBody::pg())
            .owner("alice")
            .privilege(Privilege::grant("SELECT", "reader"))
            .build();
        let new = Table::builder("users", TableBody::pg())
            .owner("bob")
            .privilege(Privilege::grant("INSERT", "writer"))
            .comment("people")
            .build();

        let mut script = SqlScript::new();
        append_attribute_alters(
            &ctx,
            AnyStatement::Table(&old),
            AnyStatement::Table(&new),
            &mut script,
        );
        let sql: Vec<&str> = script.ordered().collect();
        assert_eq!(sql.len(), 4);
        assert_eq!(sql[0], "ALTER TABLE public.users OWNER TO bob");
        assert!(sql[1].starts_with("REVOKE SELECT ON TABLE public.users"));
        assert!(sql[2].starts_with("GRANT INSERT ON TABLE public.users"));
        assert_eq!(sql[3], "COMMENT ON TABLE public.users IS 'people'");
    }

    #[test]
    fn test_unchanged_attributes_emit_nothing() {
        let settings = Settings::default();
        let id = DbObjectId::table("public", "users");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let table = Table::builder("users", TableBody::pg()).owner("alice").build();

        let mut script = SqlScript::new();
        append_attribute_alters(
            &ctx,
            AnyStatement::Table(&table),
            AnyStatement::Table(&table),
            &mut script,
        );
        assert!(script.is_empty());
    }
}
