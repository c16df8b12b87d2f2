//! SQL rendering for row-level security policies

use crate::catalog::AnyStatement;
use crate::catalog::policy::Policy;
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes};

/// `TO` target list; an empty list means every role.
pub fn roles_sql(ctx: &SqlContext<'_>, roles: &[String]) -> String {
    if roles.is_empty() {
        return "PUBLIC".to_string();
    }
    roles
        .iter()
        .map(|role| match role.to_ascii_lowercase().as_str() {
            "public" | "current_user" | "current_role" | "session_user" => role.to_ascii_uppercase(),
            _ => ctx.quote(role),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `ALTER POLICY` carrying only the clauses that are given.
pub fn alter_policy_sql(
    ctx: &SqlContext<'_>,
    name: &str,
    roles: Option<&[String]>,
    using: Option<&str>,
    with_check: Option<&str>,
) -> String {
    let mut sql = format!("ALTER POLICY {} ON {}", ctx.quote(name), ctx.parent_name());
    if let Some(roles) = roles {
        sql.push_str(&format!(" TO {}", roles_sql(ctx, roles)));
    }
    if let Some(using) = using {
        sql.push_str(&format!(" USING ({using})"));
    }
    if let Some(with_check) = with_check {
        sql.push_str(&format!(" WITH CHECK ({with_check})"));
    }
    sql
}

impl Renderable for Policy {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let mut sql = format!("CREATE POLICY {} ON {}", ctx.quote(self.name()), ctx.parent_name());
        if !self.permissive {
            sql.push_str(" AS RESTRICTIVE");
        }
        sql.push_str(&format!(" FOR {}", self.command));
        sql.push_str(&format!(" TO {}", roles_sql(ctx, &self.roles)));
        if let Some(using) = &self.using {
            sql.push_str(&format!(" USING ({using})"));
        }
        if let Some(with_check) = &self.with_check {
            sql.push_str(&format!(" WITH CHECK ({with_check})"));
        }
        script.push(ctx.guarded(sql));
        append_create_attributes(ctx, AnyStatement::Policy(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(format!(
            "DROP POLICY{} {} ON {}",
            ctx.if_exists(),
            ctx.quote(self.name()),
            ctx.parent_name()
        ));
    }
}
